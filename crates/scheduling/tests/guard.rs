use chrono::{TimeZone, Utc};
use core_types::{
    EntityKind, ScheduleDraft, Shift, ShiftDraft, ShiftTemplate, ShiftTemplateDraft, ShiftType,
    ShiftTypeDraft, Team, TeamDraft, User, UserDraft,
};
use database::MemoryStore;
use futures::future::join;
use pagination::PageLimits;
use scheduling::{Scheduling, ServiceError};

fn service() -> Scheduling<MemoryStore> {
    Scheduling::new(MemoryStore::new(), PageLimits::default())
}

async fn shift_type(service: &Scheduling<MemoryStore>, name: &str) -> ShiftType {
    service
        .create::<ShiftType>(ShiftTypeDraft {
            name: name.into(),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap()
}

async fn shift_using(service: &Scheduling<MemoryStore>, shift_type_id: i64) -> Shift {
    let user: User = service
        .create::<User>(UserDraft {
            name: "Ada".into(),
            username: format!("ada{shift_type_id}"),
            email: format!("ada{shift_type_id}@example.com"),
            role: "employee".into(),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();
    let schedule = service
        .create::<core_types::Schedule>(ScheduleDraft {
            name: "Week".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 7),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();
    service
        .create::<Shift>(ShiftDraft {
            user_id: Some(user.audit.id),
            schedule_id: Some(schedule.audit.id),
            shift_type_id: Some(shift_type_id),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).single(),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn referenced_shift_type_cannot_be_deleted() {
    let service = service();
    let night = shift_type(&service, "Night").await;
    shift_using(&service, night.audit.id).await;

    let err = service.delete::<ShiftType>(night.audit.id).await.unwrap_err();
    assert_eq!(err.primary_message(), "ShiftType still referenced by 1 shifts");
    assert!(matches!(
        err,
        ServiceError::DependencyConflict {
            entity: EntityKind::ShiftType,
            relationship: "shifts",
            count: 1
        }
    ));
    assert!(service.get::<ShiftType>(night.audit.id).await.is_ok());
}

#[tokio::test]
async fn unreferenced_shift_type_is_deleted() {
    let service = service();
    let spare = shift_type(&service, "Spare").await;

    service.delete::<ShiftType>(spare.audit.id).await.unwrap();

    let err = service.get::<ShiftType>(spare.audit.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::ShiftType, .. }));
}

#[tokio::test]
async fn any_weekday_reference_blocks_the_delete() {
    let service = service();
    let late = shift_type(&service, "Late").await;
    let template: ShiftTemplate = service
        .create::<ShiftTemplate>(ShiftTemplateDraft {
            name: "Sundays".into(),
            sunday_shift_type_id: Some(late.audit.id),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let err = service.delete::<ShiftType>(late.audit.id).await.unwrap_err();
    assert_eq!(err.primary_message(), "ShiftType still referenced by 1 shift templates");

    service.delete::<ShiftTemplate>(template.audit.id).await.unwrap();
    service.delete::<ShiftType>(late.audit.id).await.unwrap();
}

#[tokio::test]
async fn team_is_guarded_by_its_users() {
    let service = service();
    let team: Team = service
        .create::<Team>(TeamDraft {
            name: "Ops".into(),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();
    let user: User = service
        .create::<User>(UserDraft {
            name: "Lin".into(),
            username: "lin".into(),
            email: "lin@example.com".into(),
            role: "manager".into(),
            is_active: true,
            team_id: Some(team.audit.id),
            department_id: None,
        })
        .await
        .unwrap();

    let err = service.delete::<Team>(team.audit.id).await.unwrap_err();
    assert_eq!(err.primary_message(), "Team still referenced by 1 users");

    // Clearing the pointer detaches the user and frees the team.
    let patch = serde_json::from_str(r#"{"teamId": null}"#).unwrap();
    service.update::<User>(user.audit.id, patch).await.unwrap();
    service.delete::<Team>(team.audit.id).await.unwrap();
}

#[tokio::test]
async fn deleting_a_missing_record_is_not_found() {
    let service = service();
    let err = service.delete::<Team>(42).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: EntityKind::Team, id: 42 }));
}

#[tokio::test]
async fn concurrent_delete_and_insert_never_orphan_a_shift() {
    let service = service();
    let contested = shift_type(&service, "Contested").await;
    let id = contested.audit.id;
    // Parents for the shift, created up front so only the shift insert races.
    let existing = shift_using(&service, shift_type(&service, "Other").await.audit.id).await;

    let insert = service.create::<Shift>(ShiftDraft {
        user_id: Some(existing.user_id),
        schedule_id: Some(existing.schedule_id),
        shift_type_id: Some(id),
        start_time: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).single(),
        end_time: Utc.with_ymd_and_hms(2024, 1, 2, 17, 0, 0).single(),
        is_active: true,
        ..Default::default()
    });
    let delete = service.delete::<ShiftType>(id);
    let (inserted, deleted) = join(insert, delete).await;

    // Exactly one side wins: either the shift exists and the type survived,
    // or the type is gone and the shift was refused.
    match (inserted, deleted) {
        (Ok(_), Err(ServiceError::DependencyConflict { .. })) => {
            assert!(service.get::<ShiftType>(id).await.is_ok());
        }
        (Err(ServiceError::InvalidReference(_)), Ok(())) => {
            assert!(service.get::<ShiftType>(id).await.is_err());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
