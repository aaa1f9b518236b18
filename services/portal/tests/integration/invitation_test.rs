use chrono::{Duration, Utc};

use lms_auth_types::token::validate_session_token;
use lms_domain::invitation::InvitationStatus;
use lms_domain::user::UserRole;
use lms_portal::error::PortalError;
use lms_portal::usecase::invitation::{
    AcceptInvitationInput, AcceptInvitationUseCase, InviteTeacherUseCase, SetTeacherActiveUseCase,
};
use lms_portal::usecase::login::{CheckRoleUseCase, CredentialsInput};

use crate::helpers::{
    MockInvitationRepo, MockMailer, MockUserRepo, TEST_JWT_SECRET, TEST_PASSWORD, World, actor,
};

const INVITEE: &str = "new.teacher@school.edu";

fn invite(world: &World) -> InviteTeacherUseCase<MockUserRepo, MockInvitationRepo, MockMailer> {
    InviteTeacherUseCase {
        users: world.users.clone(),
        invitations: world.invitations.clone(),
        mailer: world.mailer.clone(),
        public_url: "https://lms.example.com/".to_owned(),
    }
}

fn accept(world: &World) -> AcceptInvitationUseCase<MockUserRepo, MockInvitationRepo> {
    AcceptInvitationUseCase {
        users: world.users.clone(),
        invitations: world.invitations.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

fn acceptance(token: &str) -> AcceptInvitationInput {
    AcceptInvitationInput {
        token: token.to_owned(),
        name: "Nina Teacher".to_owned(),
        password: "lecture-hall".to_owned(),
    }
}

#[tokio::test]
async fn should_create_teacher_from_invitation_and_refuse_second_acceptance() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);

    let outcome = invite(&world)
        .execute(&actor(&admin), INVITEE)
        .await
        .unwrap();
    assert!(outcome.delivered);
    let token = outcome.invitation.token.clone();
    let sent = world.mailer.sent.lock().unwrap().clone();
    assert_eq!(sent[0].to, INVITEE);
    assert!(sent[0]
        .body
        .contains(&format!("https://lms.example.com/accept-invitation?token={token}")));

    let session = accept(&world).execute(acceptance(&token)).await.unwrap();
    assert_eq!(session.user.role, UserRole::Teacher);
    assert_eq!(session.user.email, INVITEE);
    let info = validate_session_token(&session.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.role, UserRole::Teacher);

    let stored = world.invitations.invitations.lock().unwrap()[0].clone();
    assert_eq!(stored.status, InvitationStatus::Accepted);
    assert!(stored.accepted_at.is_some());

    let again = accept(&world).execute(acceptance(&token)).await;
    assert!(matches!(again, Err(PortalError::InvalidInvitation)));
}

#[tokio::test]
async fn should_supersede_pending_invitation_for_same_email() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);

    let first = invite(&world)
        .execute(&actor(&admin), INVITEE)
        .await
        .unwrap();
    let second = invite(&world)
        .execute(&actor(&admin), INVITEE)
        .await
        .unwrap();

    let stale = accept(&world)
        .execute(acceptance(&first.invitation.token))
        .await;
    assert!(matches!(stale, Err(PortalError::InvitationNotFound)));

    accept(&world)
        .execute(acceptance(&second.invitation.token))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_mark_expired_invitation_and_reject_it() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let outcome = invite(&world)
        .execute(&actor(&admin), INVITEE)
        .await
        .unwrap();
    world.invitations.invitations.lock().unwrap()[0].expires_at = Utc::now() - Duration::minutes(1);

    let result = accept(&world)
        .execute(acceptance(&outcome.invitation.token))
        .await;
    assert!(matches!(result, Err(PortalError::InvalidInvitation)));
    assert_eq!(
        world.invitations.invitations.lock().unwrap()[0].status,
        InvitationStatus::Expired
    );
    assert_eq!(world.users.users.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reserve_invitations_to_admin() {
    let world = World::default();
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);

    for user in [&teacher, &student] {
        let result = invite(&world).execute(&actor(user), INVITEE).await;
        assert!(matches!(result, Err(PortalError::Forbidden)));
    }
    assert!(world.invitations.invitations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_not_invite_registered_email() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    world.add_user("s@example.com", UserRole::Student);

    let result = invite(&world)
        .execute(&actor(&admin), "S@Example.com")
        .await;
    assert!(matches!(result, Err(PortalError::EmailAlreadyRegistered)));
}

#[tokio::test]
async fn should_keep_invitation_when_delivery_fails() {
    let world = World {
        mailer: MockMailer::failing(),
        ..Default::default()
    };
    let admin = world.add_user("admin@lms.com", UserRole::Admin);

    let outcome = invite(&world)
        .execute(&actor(&admin), INVITEE)
        .await
        .unwrap();
    assert!(!outcome.delivered);
    assert_eq!(world.invitations.invitations.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_lock_out_deactivated_teacher_until_reactivated() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let toggle = SetTeacherActiveUseCase {
        users: world.users.clone(),
    };
    let check = CheckRoleUseCase {
        users: world.users.clone(),
    };
    let credentials = || CredentialsInput {
        email: "a@school.edu".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    };

    toggle
        .execute(&actor(&admin), teacher.id, false)
        .await
        .unwrap();
    let locked = check.execute(credentials()).await;
    assert!(matches!(locked, Err(PortalError::InvalidCredentials)));

    toggle
        .execute(&actor(&admin), teacher.id, true)
        .await
        .unwrap();
    assert_eq!(check.execute(credentials()).await.unwrap(), UserRole::Teacher);
}

#[tokio::test]
async fn should_only_toggle_teachers() {
    let world = World::default();
    let admin = world.add_user("admin@lms.com", UserRole::Admin);
    let teacher = world.add_user("a@school.edu", UserRole::Teacher);
    let student = world.add_user("s@example.com", UserRole::Student);
    let toggle = SetTeacherActiveUseCase {
        users: world.users.clone(),
    };

    let not_teacher = toggle.execute(&actor(&admin), student.id, false).await;
    assert!(matches!(not_teacher, Err(PortalError::InvalidInput(_))));

    let missing = toggle
        .execute(&actor(&admin), uuid::Uuid::new_v4(), false)
        .await;
    assert!(matches!(missing, Err(PortalError::UserNotFound)));

    let by_teacher = toggle.execute(&actor(&teacher), teacher.id, false).await;
    assert!(matches!(by_teacher, Err(PortalError::Forbidden)));
}
