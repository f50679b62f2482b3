//! Helpers shared by the integration test binaries.

use etms::actor::{
    domain::{Actor, EmailAddress, RoleProfile},
    ports::ActorRepository,
};
use eyre::WrapErr;
use mockable::DefaultClock;

/// One administrator, two managers, and two staff members.
#[derive(Debug, Clone)]
pub struct Team {
    pub admin: Actor,
    pub manager: Actor,
    pub other_manager: Actor,
    pub staff: Actor,
    pub other_staff: Actor,
}

fn member(name: &str, email: &str, profile: RoleProfile) -> Result<Actor, eyre::Report> {
    let address = EmailAddress::new(email).wrap_err("team e-mail")?;
    Actor::new(name, address, profile, &DefaultClock).wrap_err("team member")
}

/// Creates and stores a small organisation.
///
/// # Errors
///
/// Returns an error when an actor cannot be built or stored.
pub async fn seed_team<A: ActorRepository>(actors: &A) -> Result<Team, eyre::Report> {
    let manager = member(
        "Mia Manager",
        "mia@example.com",
        RoleProfile::manager(Some("Operations".to_owned()))?,
    )?;
    let other_manager = member(
        "Max Manager",
        "max@example.com",
        RoleProfile::manager(None)?,
    )?;
    let staff = member(
        "Sam Staff",
        "sam@example.com",
        RoleProfile::staff(Some(manager.id()), None)?,
    )?;
    let other_staff = member(
        "Sky Staff",
        "sky@example.com",
        RoleProfile::staff(Some(other_manager.id()), None)?,
    )?;
    let team = Team {
        admin: member("Ada Admin", "ada@example.com", RoleProfile::Admin)?,
        manager,
        other_manager,
        staff,
        other_staff,
    };
    for actor in [
        &team.admin,
        &team.manager,
        &team.other_manager,
        &team.staff,
        &team.other_staff,
    ] {
        actors
            .store(actor)
            .await
            .wrap_err_with(|| format!("store {}", actor.display_name()))?;
    }
    Ok(team)
}
