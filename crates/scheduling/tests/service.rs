use chrono::{Duration, TimeZone, Utc};
use core_types::{
    Department, DepartmentDraft, Schedule, ScheduleDraft, Shift, ShiftDraft, ShiftTemplate,
    ShiftType, Team, TeamMember, TeamMemberDraft, User, UserDraft,
};
use database::MemoryStore;
use pagination::PageLimits;
use scheduling::{Params, Scheduling, ServiceError};

fn service() -> Scheduling<MemoryStore> {
    Scheduling::new(MemoryStore::new(), PageLimits::default())
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn departments(service: &Scheduling<MemoryStore>, n: usize) {
    for i in 0..n {
        service
            .create::<Department>(DepartmentDraft {
                name: format!("Dept {i:02}"),
                is_active: true,
                ..Default::default()
            })
            .await
            .unwrap();
    }
}

async fn seeded() -> Scheduling<MemoryStore> {
    let service = service();
    service.lifecycle().seed().await.unwrap();
    service
}

#[tokio::test]
async fn create_then_get_round_trips_through_the_store() {
    let service = service();
    let created = service
        .create::<User>(UserDraft {
            name: "Grace".into(),
            username: "grace".into(),
            email: "grace@example.com".into(),
            role: "manager".into(),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.audit.id, 1);
    let fetched = service.get::<User>(created.audit.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn invalid_drafts_are_rejected_with_the_first_message() {
    let service = service();
    let err = service
        .create::<User>(UserDraft {
            role: "owner".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.primary_message(), "name is required");
    match err {
        ServiceError::Validation { messages } => {
            let role = "role must be one of: admin, manager, employee".to_string();
            assert!(messages.contains(&role));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    let page = service.list::<User>(&Params::new()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn schedule_dates_must_be_ordered() {
    let service = service();
    let err = service
        .create::<Schedule>(ScheduleDraft {
            name: "Backwards".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 2, 1),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.primary_message(), "startDate must not be after endDate");
}

#[tokio::test]
async fn page_form_reports_page_numbers() {
    let service = service();
    departments(&service, 25).await;

    let page = service
        .list::<Department>(&params(&[("page", "3"), ("pageSize", "10")]))
        .await
        .unwrap();

    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data.len(), 5);
    assert_eq!(page.page, Some(3));
    assert!(!page.has_more);
    assert_eq!(page.data[0].name, "Dept 20");
}

#[tokio::test]
async fn offset_past_the_end_returns_an_empty_page() {
    let service = service();
    departments(&service, 15).await;

    let page = service
        .list::<Department>(&params(&[("limit", "5"), ("offset", "100")]))
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.total, 15);
    assert_eq!(page.total_pages, 3);
    assert!(!page.has_more);
    assert_eq!(page.page, None);
}

#[tokio::test]
async fn oversized_pages_are_clamped() {
    let service = service();
    departments(&service, 3).await;

    let page = service
        .list::<Department>(&params(&[("limit", "5000")]))
        .await
        .unwrap();
    assert_eq!(page.limit, 100);
    assert_eq!(page.data.len(), 3);
}

#[tokio::test]
async fn list_filters_narrow_the_collection() {
    let service = seeded().await;

    let managers = service
        .list::<User>(&params(&[("role", "manager")]))
        .await
        .unwrap();
    assert_eq!(managers.total, 1);
    assert_eq!(managers.data[0].username, "bob");

    let shifts = service
        .list::<Shift>(&params(&[("scheduleId", "2")]))
        .await
        .unwrap();
    assert_eq!(shifts.total, 3);
    assert!(shifts.data.iter().all(|s| s.schedule_id == 2));

    let schedules = service.list::<Schedule>(&Params::new()).await.unwrap();
    let names: Vec<&str> = schedules.data.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["January 2024", "Week 1", "Week 2"]);
}

#[tokio::test]
async fn mixed_case_roles_are_found_by_the_role_filter() {
    let service = service();
    let created = service
        .create::<User>(UserDraft {
            name: "Hana".into(),
            username: "hana".into(),
            email: "hana@example.com".into(),
            role: "Manager".into(),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.role, "manager");

    let managers = service
        .list::<User>(&params(&[("role", "manager")]))
        .await
        .unwrap();
    assert_eq!(managers.total, 1);
    assert_eq!(managers.data[0].username, "hana");
}

#[tokio::test]
async fn a_date_bound_covers_the_last_fraction_of_the_day() {
    let service = seeded().await;
    let late = Utc.with_ymd_and_hms(2024, 1, 20, 23, 59, 59).unwrap() + Duration::milliseconds(500);
    let created = service
        .create::<Shift>(ShiftDraft {
            user_id: Some(1),
            schedule_id: Some(3),
            shift_type_id: Some(1),
            start_time: Some(late),
            end_time: Some(late + Duration::hours(2)),
            is_active: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let day = params(&[("from", "2024-01-20"), ("to", "2024-01-20")]);
    let found = service.list::<Shift>(&day).await.unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.data[0].audit.id, created.audit.id);

    let before = params(&[("from", "2024-01-20"), ("to", "2024-01-20T23:59:59Z")]);
    assert_eq!(service.list::<Shift>(&before).await.unwrap().total, 0);
}

#[tokio::test]
async fn patch_changes_only_the_fields_it_carries() {
    let service = service();
    let team = service
        .create::<Team>(core_types::TeamDraft {
            name: "Bar".into(),
            description: "Drinks".into(),
            color: "#000000".into(),
            is_active: true,
            sort_order: 5,
        })
        .await
        .unwrap();

    let patch = serde_json::from_str(r##"{"color": "#FFFFFF"}"##).unwrap();
    let updated = service.update::<Team>(team.audit.id, patch).await.unwrap();

    assert_eq!(updated.color, "#FFFFFF");
    assert_eq!(updated.description, "Drinks");
    assert_eq!(updated.sort_order, 5);
    assert_eq!(updated.audit.id, team.audit.id);
    assert_eq!(updated.audit.created_at, team.audit.created_at);
}

#[tokio::test]
async fn patch_that_breaks_a_rule_leaves_the_record_alone() {
    let service = seeded().await;
    let morning = service.get::<ShiftType>(1).await.unwrap();

    let patch = serde_json::from_str(r#"{"minDurationMinutes": 600, "maxDurationMinutes": 60}"#)
        .unwrap();
    let err = service.update::<ShiftType>(1, patch).await.unwrap_err();

    assert_eq!(
        err.primary_message(),
        "minDurationMinutes must not exceed maxDurationMinutes"
    );
    assert_eq!(service.get::<ShiftType>(1).await.unwrap(), morning);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let service = service();
    let patch = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
    let err = service.update::<Team>(9, patch).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
    assert_eq!(err.primary_message(), "Team 9 not found");
}

#[tokio::test]
async fn dangling_references_are_rejected() {
    let service = service();
    let err = service
        .create::<User>(UserDraft {
            name: "Orphan".into(),
            username: "orphan".into(),
            email: "orphan@example.com".into(),
            role: "employee".into(),
            is_active: true,
            team_id: Some(77),
            department_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidReference(_)));
}

#[tokio::test]
async fn a_user_joins_a_team_once() {
    let service = seeded().await;
    let existing = service.list::<TeamMember>(&Params::new()).await.unwrap();
    let member = &existing.data[0];

    let err = service
        .create::<TeamMember>(TeamMemberDraft {
            team_id: Some(member.team_id),
            user_id: Some(member.user_id),
            role: "member".into(),
            joined_at: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "duplicate_key");

    // Leaving frees the pair for a new membership.
    service.delete::<TeamMember>(member.audit.id).await.unwrap();
    service
        .create::<TeamMember>(TeamMemberDraft {
            team_id: Some(member.team_id),
            user_id: Some(member.user_id),
            role: "lead".into(),
            joined_at: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn schedule_detail_preloads_its_shifts_in_order() {
    let service = seeded().await;
    let detail = service.schedule_detail(1).await.unwrap();

    assert_eq!(detail.schedule.audit.id, 1);
    assert!(!detail.shifts.is_empty());
    assert!(detail.shifts.iter().all(|s| s.schedule_id == 1));
    assert!(detail.shifts.windows(2).all(|w| w[0].start_time <= w[1].start_time));

    let json = serde_json::to_value(&detail).unwrap();
    assert!(json.get("startDate").is_some());
    assert!(json["shifts"].is_array());
}

#[tokio::test]
async fn template_detail_resolves_each_weekday() {
    let service = seeded().await;
    let template = service.get::<ShiftTemplate>(1).await.unwrap();
    let detail = service.template_detail(1).await.unwrap();

    assert_eq!(detail.days.len(), 7);
    assert_eq!(detail.days[0].weekday, "monday");
    for (day, id) in detail.days.iter().zip(template.days()) {
        assert_eq!(day.shift_type.as_ref().map(|t| t.audit.id), id);
    }
}

#[tokio::test]
async fn team_detail_lists_users_and_members() {
    let service = seeded().await;
    let detail = service.team_detail(1).await.unwrap();

    assert_eq!(detail.team.name, "Front Desk");
    assert!(detail.users.iter().all(|u| u.team_id == Some(1)));
    assert!(detail.members.iter().all(|m| m.team_id == 1));
}

#[tokio::test]
async fn health_follows_the_store() {
    let service = service();
    service.health().await.unwrap();

    service.store().set_available(false);
    let err = service.health().await.unwrap_err();
    assert_eq!(err.kind(), "store_unavailable");
}
