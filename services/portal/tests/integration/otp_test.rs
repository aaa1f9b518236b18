use chrono::{Duration, Utc};
use uuid::Uuid;

use lms_portal::domain::repository::OneTimeCodeRepository;
use lms_portal::domain::types::{OTP_TTL_SECS, OneTimeCode};
use lms_portal::error::{CodeRejection, PortalError};
use lms_portal::usecase::otp::CodePurpose;

use crate::helpers::World;

const EMAIL: &str = "s@example.com";

fn stored_code(code: &str, expires_in: Duration) -> OneTimeCode {
    let now = Utc::now();
    OneTimeCode {
        id: Uuid::new_v4(),
        email: EMAIL.to_owned(),
        code: code.to_owned(),
        expires_at: now + expires_in,
        consumed_at: None,
        created_at: now,
    }
}

#[tokio::test]
async fn should_issue_six_digit_code_expiring_after_ttl() {
    let world = World::default();
    let before = Utc::now();
    world.otp().issue(EMAIL, CodePurpose::Login).await.unwrap();

    let codes = world.codes.codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    let code = &codes[0];
    assert_eq!(code.code.len(), 6);
    assert!(code.code.chars().all(|c| c.is_ascii_digit()));
    assert!(code.expires_at >= before + Duration::seconds(OTP_TTL_SECS));
    assert!(code.expires_at <= Utc::now() + Duration::seconds(OTP_TTL_SECS));
}

#[tokio::test]
async fn should_accept_code_once_and_reject_every_later_attempt() {
    let world = World::default();
    let otp = world.otp();
    otp.issue(EMAIL, CodePurpose::Login).await.unwrap();
    let code = world.latest_code(EMAIL);

    otp.verify(EMAIL, &code).await.unwrap();
    for _ in 0..3 {
        let err = otp.verify(EMAIL, &code).await.unwrap_err();
        assert!(matches!(err, PortalError::InvalidCode(_)));
    }
}

#[tokio::test]
async fn should_invalidate_first_code_when_second_is_issued() {
    let world = World::default();
    let otp = world.otp();
    otp.issue(EMAIL, CodePurpose::Login).await.unwrap();
    let first = world.latest_code(EMAIL);
    otp.issue(EMAIL, CodePurpose::Login).await.unwrap();
    let second = world.latest_code(EMAIL);

    // Two draws of six digits can collide; nothing to check then.
    if first != second {
        let err = otp.verify(EMAIL, &first).await.unwrap_err();
        assert!(matches!(
            err,
            PortalError::InvalidCode(CodeRejection::NotFound)
        ));
    }
    otp.verify(EMAIL, &second).await.unwrap();
}

#[tokio::test]
async fn should_reject_expired_code_without_consuming_it() {
    let world = World::default();
    let expired = stored_code("111111", Duration::seconds(-1));
    let fresh = stored_code("222222", Duration::seconds(OTP_TTL_SECS));
    world
        .codes
        .codes
        .lock()
        .unwrap()
        .extend([expired.clone(), fresh]);

    let otp = world.otp();
    let err = otp.verify(EMAIL, "111111").await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::InvalidCode(CodeRejection::Expired)
    ));
    let still_unconsumed = world
        .codes
        .codes
        .lock()
        .unwrap()
        .iter()
        .find(|c| c.id == expired.id)
        .unwrap()
        .consumed_at
        .is_none();
    assert!(still_unconsumed);

    otp.verify(EMAIL, "222222").await.unwrap();

    // Expired stays expired on retry.
    let err = otp.verify(EMAIL, "111111").await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::InvalidCode(CodeRejection::Expired)
    ));
}

#[tokio::test]
async fn should_not_accept_code_bound_to_another_email() {
    let world = World::default();
    let otp = world.otp();
    otp.issue(EMAIL, CodePurpose::Registration).await.unwrap();
    let code = world.latest_code(EMAIL);

    let err = otp.verify("other@example.com", &code).await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::InvalidCode(CodeRejection::NotFound)
    ));
}

#[tokio::test]
async fn should_let_only_one_of_two_concurrent_verifications_succeed() {
    let world = World::default();
    let otp = world.otp();
    otp.issue(EMAIL, CodePurpose::Login).await.unwrap();
    let code = world.latest_code(EMAIL);

    let (a, b) = tokio::join!(otp.verify(EMAIL, &code), otp.verify(EMAIL, &code));
    assert_eq!(
        [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "exactly one verification may win"
    );
}

#[tokio::test]
async fn should_flip_consumed_flag_only_once() {
    let world = World::default();
    let otp = world.otp();
    otp.issue(EMAIL, CodePurpose::Login).await.unwrap();
    let code = world.latest_code(EMAIL);

    let found = world
        .codes
        .codes
        .lock()
        .unwrap()
        .iter()
        .find(|c| c.code == code)
        .cloned()
        .unwrap();
    assert!(world.codes.consume(found.id, Utc::now()).await.unwrap());
    assert!(!world.codes.consume(found.id, Utc::now()).await.unwrap());
}
