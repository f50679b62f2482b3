//! Helpers shared by unit tests across modules.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::{Clock, DefaultClock};

use crate::actor::{
    adapters::memory::InMemoryActorRepository,
    domain::{Actor, EmailAddress, RoleProfile},
    ports::ActorRepository,
};
use crate::work_item::{
    adapters::memory::{InMemorySequenceCounter, InMemoryWorkItemRepository},
    domain::Task,
    ports::SequenceSource,
    services::{CreateTaskRequest, ExternalIdAllocator, WorkItemService},
};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub(crate) fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
                .single()
                .expect("valid start time"),
        )
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

pub(crate) type TestService<S = InMemorySequenceCounter> =
    WorkItemService<InMemoryWorkItemRepository, InMemoryActorRepository, S, ManualClock>;

/// One administrator, two managers, and two staff members.
#[derive(Debug, Clone)]
pub(crate) struct Team {
    pub(crate) admin: Actor,
    pub(crate) manager: Actor,
    pub(crate) other_manager: Actor,
    pub(crate) staff: Actor,
    pub(crate) other_staff: Actor,
}

pub(crate) struct Harness<S = InMemorySequenceCounter>
where
    S: SequenceSource,
{
    pub(crate) repository: Arc<InMemoryWorkItemRepository>,
    pub(crate) actors: Arc<InMemoryActorRepository>,
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) service: TestService<S>,
    pub(crate) team: Team,
}

fn actor(name: &str, email: &str, profile: RoleProfile) -> Actor {
    Actor::new(
        name,
        EmailAddress::new(email).expect("valid email"),
        profile,
        &DefaultClock,
    )
    .expect("valid actor")
}

async fn seed_team(actors: &InMemoryActorRepository) -> Team {
    let manager = actor(
        "Mia Manager",
        "mia@example.com",
        RoleProfile::manager(Some("Operations".to_owned())).expect("valid profile"),
    );
    let other_manager = actor(
        "Max Manager",
        "max@example.com",
        RoleProfile::manager(None).expect("valid profile"),
    );
    let staff = actor(
        "Sam Staff",
        "sam@example.com",
        RoleProfile::staff(Some(manager.id()), None).expect("valid profile"),
    );
    let other_staff = actor(
        "Sky Staff",
        "sky@example.com",
        RoleProfile::staff(Some(other_manager.id()), None).expect("valid profile"),
    );
    let team = Team {
        admin: actor("Ada Admin", "ada@example.com", RoleProfile::Admin),
        manager,
        other_manager,
        staff,
        other_staff,
    };
    for member in [
        &team.admin,
        &team.manager,
        &team.other_manager,
        &team.staff,
        &team.other_staff,
    ] {
        actors.store(member).await.expect("actor should store");
    }
    team
}

impl<S> Harness<S>
where
    S: SequenceSource,
{
    pub(crate) async fn with_source(source: Arc<S>) -> Self {
        Self::with_allocator(ExternalIdAllocator::new(source)).await
    }

    pub(crate) async fn with_allocator(allocator: ExternalIdAllocator<S>) -> Self {
        Self::with_repository(Arc::new(InMemoryWorkItemRepository::new()), allocator).await
    }

    pub(crate) async fn with_repository(
        repository: Arc<InMemoryWorkItemRepository>,
        allocator: ExternalIdAllocator<S>,
    ) -> Self {
        let actors = Arc::new(InMemoryActorRepository::new());
        let team = seed_team(&actors).await;
        let clock = Arc::new(ManualClock::default());
        let service = WorkItemService::new(
            Arc::clone(&repository),
            Arc::clone(&actors),
            allocator,
            Arc::clone(&clock),
        );
        Self {
            repository,
            actors,
            clock,
            service,
            team,
        }
    }

    /// Creates a task assigned to the team's first manager.
    pub(crate) async fn task(&self, title: &str) -> Task {
        self.service
            .create_task(
                &self.team.admin,
                CreateTaskRequest::new(title, self.team.manager.id()),
            )
            .await
            .expect("task creation should succeed")
    }
}

impl Harness {
    pub(crate) async fn new() -> Self {
        Self::with_source(Arc::new(InMemorySequenceCounter::new())).await
    }
}
