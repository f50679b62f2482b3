//! Embedded `PostgreSQL` cluster shared by every test in this binary.
//!
//! The cluster starts in-process on first use. When it cannot start, for
//! example when the tests run as root without a privilege-dropping helper,
//! tests skip instead of failing.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use pg_embedded_setup_unpriv::{
    ExecutionPrivileges, bootstrap_for_tests, detect_execution_privileges,
};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use tokio::runtime::Runtime;

use crate::env_guard::ScopedEnv;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

static SHARED_CLUSTER: OnceLock<Option<ManagedCluster>> = OnceLock::new();

/// A running cluster together with the runtime that owns its process handle.
pub struct ManagedCluster {
    settings: Settings,
    _postgres: PostgreSQL,
    _runtime: Runtime,
}

impl ManagedCluster {
    fn start() -> Result<Self, BoxError> {
        if matches!(detect_execution_privileges(), ExecutionPrivileges::Root) {
            return Err("embedded PostgreSQL needs an unprivileged user".into());
        }
        let mut bootstrap = bootstrap_for_tests()?;
        sync_password_from_file(&mut bootstrap.settings)?;
        let env_vars = bootstrap.environment.to_env();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let scoped = ScopedEnv::apply(&env_vars);
        let mut postgres = PostgreSQL::new(bootstrap.settings.clone());
        runtime.block_on(async {
            postgres.setup().await?;
            if !matches!(postgres.status(), Status::Started) {
                postgres.start().await?;
            }
            Ok::<(), postgresql_embedded::Error>(())
        })?;
        drop(scoped);

        let mut settings = postgres.settings().clone();
        sync_port_from_pid(&mut settings)?;
        Ok(Self {
            settings,
            _postgres: postgres,
            _runtime: runtime,
        })
    }

    /// Connection URL for `database` on this cluster.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.settings.url(database)
    }

    /// Creates an empty database.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin connection or the statement fails.
    pub fn create_database(&self, name: &str) -> Result<(), BoxError> {
        let mut admin = PgConnection::establish(&self.database_url("postgres"))?;
        let statement = format!("CREATE DATABASE \"{}\"", name.replace('"', "\"\""));
        diesel::sql_query(statement).execute(&mut admin)?;
        Ok(())
    }
}

/// Returns the shared cluster, starting it on first use, or `None` when
/// `PostgreSQL` cannot run here.
pub fn shared_cluster() -> Option<&'static ManagedCluster> {
    SHARED_CLUSTER
        .get_or_init(|| {
            // The cluster owns a runtime, which cannot be built on a thread
            // that already runs inside the test's runtime.
            let started = std::thread::spawn(ManagedCluster::start)
                .join()
                .map_err(|_| BoxError::from("cluster start-up panicked"))
                .and_then(|result| result);
            match started {
                Ok(cluster) => Some(cluster),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping PostgreSQL tests");
                    None
                }
            }
        })
        .as_ref()
}

fn open_dir(path: &Path) -> Result<Dir, BoxError> {
    Ok(Dir::open_ambient_dir(path, ambient_authority())?)
}

fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let (Some(parent), Some(file_name)) = (
        settings.password_file.parent(),
        settings.password_file.file_name(),
    ) else {
        return Ok(());
    };
    match open_dir(parent)?.read_to_string(file_name) {
        Ok(contents) => {
            let password = contents.trim_end();
            if !password.is_empty() {
                password.clone_into(&mut settings.password);
            }
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let contents = match open_dir(&settings.data_dir)?.read_to_string("postmaster.pid") {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}
