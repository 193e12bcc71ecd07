use std::sync::Arc;

use chrono::NaiveTime;
use tms_rust::api::{
    BulkEntryRow, BulkStatus, BulkUpdateRow, ClassId, ClassTimetableId, ConflictFilter,
    CreateClassTimetableSpec, CreateMasterTimetableSpec, CreateTeacherTimetableSpec,
    MasterTimetableFilter, MasterTimetableId, PeriodId, ScheduleEntryId, ScheduleEntrySpec,
    ScheduleEntryUpdate, TeacherId, TenantId,
};
use tms_rust::db::repositories::LocalRepository;
use tms_rust::db::repository::RepositoryError;
use tms_rust::db::services::{
    bulk_create_schedule_entries, bulk_delete_schedule_entries, bulk_update_schedule_entries,
    create_class_timetable, create_master_timetable, create_teacher_timetable,
    delete_schedule_entry, get_class_daily_schedule, get_class_weekly_schedule, get_conflicts,
    get_period_grid, get_room_utilization, get_teacher_weekly_schedule, get_teacher_workload,
    get_timetable_analytics, health_check, list_master_timetables, place_schedule_entry,
    resolve_conflict, update_schedule_entry,
};
use tms_rust::models::{
    ClassTimetable, ConflictSeverity, ConflictType, DayOfWeek, MasterTimetable, PeriodType,
    TeacherTimetable, TimetablePeriod, TimetableStatus,
};

const YEAR: &str = "2025-2026";

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Standard 8-period day: 9:00-16:15 fits 8x45' + 15' break + 60' lunch
/// exactly.
fn master_spec(tenant_id: TenantId, name: &str) -> CreateMasterTimetableSpec {
    CreateMasterTimetableSpec {
        tenant_id,
        timetable_name: name.to_string(),
        description: None,
        academic_year: YEAR.to_string(),
        term: None,
        effective_from: None,
        effective_until: None,
        total_periods_per_day: 8,
        school_start_time: t(9, 0),
        school_end_time: t(16, 15),
        period_duration: 45,
        break_duration: 15,
        lunch_duration: 60,
        working_days: DayOfWeek::weekdays(),
        status: TimetableStatus::Active,
        is_default: false,
        auto_generate_periods: true,
    }
}

fn class_spec(
    tenant_id: TenantId,
    master_timetable_id: MasterTimetableId,
    name: &str,
) -> CreateClassTimetableSpec {
    CreateClassTimetableSpec {
        tenant_id,
        class_id: ClassId::generate(),
        master_timetable_id,
        academic_year: YEAR.to_string(),
        term: None,
        class_name: Some(name.to_string()),
        grade_level: Some("7".to_string()),
    }
}

fn teacher_spec(
    tenant_id: TenantId,
    master_timetable_id: MasterTimetableId,
    name: &str,
) -> CreateTeacherTimetableSpec {
    CreateTeacherTimetableSpec {
        tenant_id,
        teacher_id: TeacherId::generate(),
        master_timetable_id,
        academic_year: YEAR.to_string(),
        term: None,
        teacher_name: Some(name.to_string()),
        max_periods_per_day: 8,
        total_periods_per_week: 40,
        preferred_periods: vec![],
        preferred_days: vec![],
    }
}

fn entry_spec(
    tenant_id: TenantId,
    class_timetable_id: ClassTimetableId,
    period_id: PeriodId,
    day: DayOfWeek,
    subject: &str,
) -> ScheduleEntrySpec {
    ScheduleEntrySpec {
        tenant_id,
        class_timetable_id,
        teacher_timetable_id: None,
        period_id,
        day_of_week: day,
        subject_name: subject.to_string(),
        subject_code: None,
        teacher_name: Some("A. Verma".to_string()),
        room_number: None,
        building: None,
        notes: None,
        is_substitution: false,
        is_recurring: true,
        effective_date: None,
        expiry_date: None,
    }
}

/// Create a master timetable with its generated grid and one class bound
/// to it. Most placement tests start here.
async fn seed_class(
    repo: &LocalRepository,
    tenant: TenantId,
    class_name: &str,
) -> (MasterTimetable, Vec<TimetablePeriod>, ClassTimetable) {
    let master = create_master_timetable(repo, &master_spec(tenant, "Standard Week"))
        .await
        .unwrap();
    let periods = get_period_grid(repo, tenant, master.id).await.unwrap();
    let class = create_class_timetable(repo, &class_spec(tenant, master.id, class_name))
        .await
        .unwrap();
    (master, periods, class)
}

async fn seed_teacher(
    repo: &LocalRepository,
    tenant: TenantId,
    master_timetable_id: MasterTimetableId,
    name: &str,
) -> TeacherTimetable {
    create_teacher_timetable(repo, &teacher_spec(tenant, master_timetable_id, name))
        .await
        .unwrap()
}

fn grid_period(periods: &[TimetablePeriod], number: f64) -> &TimetablePeriod {
    periods
        .iter()
        .find(|p| p.period_number == number)
        .expect("period grid should contain the requested period")
}

#[tokio::test]
async fn test_health_check() {
    let repo = LocalRepository::new();
    let result = health_check(&repo).await;

    assert!(result.is_ok());
    assert!(result.unwrap());
}

#[tokio::test]
async fn test_create_master_timetable_generates_grid() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();

    let master = create_master_timetable(&repo, &master_spec(tenant, "Standard Week"))
        .await
        .unwrap();
    assert_eq!(master.timetable_name, "Standard Week");
    assert_eq!(master.academic_year, YEAR);

    let periods = get_period_grid(&repo, tenant, master.id).await.unwrap();
    // 8 regular periods plus the morning break and lunch.
    assert_eq!(periods.len(), 10);
    assert_eq!(periods.iter().filter(|p| p.is_teaching_period).count(), 8);

    // Ordered by period number and contiguous in time.
    for pair in periods.windows(2) {
        assert!(pair[0].period_number < pair[1].period_number);
        assert_eq!(pair[0].end_time, pair[1].start_time);
    }
    assert_eq!(periods[0].start_time, t(9, 0));
    assert_eq!(periods.last().unwrap().end_time, t(16, 15));

    let break_slot = grid_period(&periods, 3.5);
    assert_eq!(break_slot.period_type, PeriodType::Break);
    assert_eq!(break_slot.period_name, "Morning Break");
    let lunch_slot = grid_period(&periods, 6.5);
    assert_eq!(lunch_slot.period_type, PeriodType::Lunch);
}

#[tokio::test]
async fn test_skipped_generation_stores_no_periods() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();

    let mut spec = master_spec(tenant, "Manual Grid");
    spec.auto_generate_periods = false;
    let master = create_master_timetable(&repo, &spec).await.unwrap();

    let periods = get_period_grid(&repo, tenant, master.id).await.unwrap();
    assert!(periods.is_empty());
}

#[tokio::test]
async fn test_oversized_grid_rejected_even_when_generation_is_skipped() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();

    // 8x45 + 15 + 60 = 435 minutes do not fit a 9:00-10:00 day.
    let mut spec = master_spec(tenant, "Does Not Fit");
    spec.school_end_time = t(10, 0);
    spec.auto_generate_periods = false;

    let err = create_master_timetable(&repo, &spec).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));

    // Nothing was persisted.
    let all = list_master_timetables(&repo, tenant, &MasterTimetableFilter::default())
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_master_timetable_spec_validation() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();

    let mut spec = master_spec(tenant, "  ");
    let err = create_master_timetable(&repo, &spec).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(err.message(), "timetable_name must not be empty");

    spec = master_spec(tenant, "No Days");
    spec.working_days = vec![];
    let err = create_master_timetable(&repo, &spec).await.unwrap_err();
    assert_eq!(err.message(), "working_days must not be empty");
}

#[tokio::test]
async fn test_period_grid_of_unknown_master_is_not_found() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();

    let err = get_period_grid(&repo, tenant, MasterTimetableId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_list_master_timetables_aggregates_usage_counts() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();

    let (master, periods, class) = seed_class(&repo, tenant, "7A").await;
    let teacher = seed_teacher(&repo, tenant, master.id, "S. Iyer").await;

    let mut spec = entry_spec(
        tenant,
        class.id,
        grid_period(&periods, 1.0).id,
        DayOfWeek::Monday,
        "Maths",
    );
    spec.teacher_timetable_id = Some(teacher.id);
    place_schedule_entry(&repo, &spec).await.unwrap();

    let mut draft = master_spec(tenant, "Next Term Draft");
    draft.status = TimetableStatus::Draft;
    let unused = create_master_timetable(&repo, &draft).await.unwrap();

    let summaries = list_master_timetables(&repo, tenant, &MasterTimetableFilter::default())
        .await
        .unwrap();
    assert_eq!(summaries.len(), 2);

    let used = summaries
        .iter()
        .find(|s| s.timetable.id == master.id)
        .unwrap();
    assert_eq!(used.total_classes, 1);
    assert_eq!(used.total_teachers, 1);
    assert_eq!(used.total_schedule_entries, 1);

    let empty = summaries
        .iter()
        .find(|s| s.timetable.id == unused.id)
        .unwrap();
    assert_eq!(empty.total_classes, 0);
    assert_eq!(empty.total_schedule_entries, 0);

    // Status filter narrows the listing.
    let drafts = list_master_timetables(
        &repo,
        tenant,
        &MasterTimetableFilter {
            academic_year: None,
            status: Some(TimetableStatus::Draft),
        },
    )
    .await
    .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].timetable.id, unused.id);
}

#[tokio::test]
async fn test_class_binding_requires_existing_master() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();

    let spec = class_spec(tenant, MasterTimetableId::generate(), "7A");
    let err = create_class_timetable(&repo, &spec).await.unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::ReferentialIntegrityError { .. }
    ));
    assert!(err.message().contains("Master timetable"));
}

#[tokio::test]
async fn test_duplicate_class_binding_rejected() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (master, _, class) = seed_class(&repo, tenant, "7A").await;

    let mut dup = class_spec(tenant, master.id, "7A again");
    dup.class_id = class.class_id;
    let err = create_class_timetable(&repo, &dup).await.unwrap_err();

    assert!(matches!(err, RepositoryError::DuplicateBindingError { .. }));
    assert!(err.message().contains("already has an active timetable"));
}

#[tokio::test]
async fn test_place_schedule_entry() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    let spec = entry_spec(
        tenant,
        class.id,
        grid_period(&periods, 1.0).id,
        DayOfWeek::Monday,
        "Maths",
    );
    let outcome = place_schedule_entry(&repo, &spec).await.unwrap();

    assert_eq!(outcome.entry.subject_name, "Maths");
    assert!(outcome.entry.is_active);
    assert!(outcome.entry.batch_id.is_none());
    assert!(outcome.conflicts.is_empty());
    assert!(outcome.replaced_entry_id.is_none());
}

#[tokio::test]
async fn test_occupied_class_cell_rejects_single_placement() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;
    let period_id = grid_period(&periods, 1.0).id;

    let first = entry_spec(tenant, class.id, period_id, DayOfWeek::Monday, "Maths");
    place_schedule_entry(&repo, &first).await.unwrap();

    let second = entry_spec(tenant, class.id, period_id, DayOfWeek::Monday, "Physics");
    let err = place_schedule_entry(&repo, &second).await.unwrap_err();

    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(
        err.message(),
        "An active schedule entry already occupies this class cell"
    );

    // A different day is a different cell.
    let tuesday = entry_spec(tenant, class.id, period_id, DayOfWeek::Tuesday, "Physics");
    assert!(place_schedule_entry(&repo, &tuesday).await.is_ok());
}

#[tokio::test]
async fn test_placement_validates_references() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    // Unknown class binding.
    let spec = entry_spec(
        tenant,
        ClassTimetableId::generate(),
        grid_period(&periods, 1.0).id,
        DayOfWeek::Monday,
        "Maths",
    );
    let err = place_schedule_entry(&repo, &spec).await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::ReferentialIntegrityError { .. }
    ));
    assert!(err.message().contains("not found or inactive"));

    // Period belonging to another master timetable.
    let other = create_master_timetable(&repo, &master_spec(tenant, "Other Master"))
        .await
        .unwrap();
    let other_periods = get_period_grid(&repo, tenant, other.id).await.unwrap();
    let spec = entry_spec(
        tenant,
        class.id,
        other_periods[0].id,
        DayOfWeek::Monday,
        "Maths",
    );
    let err = place_schedule_entry(&repo, &spec).await.unwrap_err();
    assert!(err.message().contains("does not belong"));
}

#[tokio::test]
async fn test_teacher_double_booking_is_recorded_not_blocking() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (master, periods, class_a) = seed_class(&repo, tenant, "7A").await;
    let class_b = create_class_timetable(&repo, &class_spec(tenant, master.id, "8B"))
        .await
        .unwrap();
    let teacher = seed_teacher(&repo, tenant, master.id, "A. Verma").await;
    let period_id = grid_period(&periods, 2.0).id;

    let mut first = entry_spec(tenant, class_a.id, period_id, DayOfWeek::Monday, "Maths");
    first.teacher_timetable_id = Some(teacher.id);
    let outcome = place_schedule_entry(&repo, &first).await.unwrap();
    assert!(outcome.conflicts.is_empty());

    let mut second = entry_spec(tenant, class_b.id, period_id, DayOfWeek::Monday, "Physics");
    second.teacher_timetable_id = Some(teacher.id);
    let outcome = place_schedule_entry(&repo, &second).await.unwrap();

    // The placement succeeded and carries the conflict record.
    assert_eq!(outcome.conflicts.len(), 1);
    let conflict = &outcome.conflicts[0];
    assert_eq!(conflict.conflict_type, ConflictType::TeacherDoubleBooking);
    assert_eq!(conflict.severity, ConflictSeverity::High);
    assert_eq!(conflict.teacher_id, Some(teacher.teacher_id));
    assert!(!conflict.is_resolved);

    let open = get_conflicts(&repo, tenant, &ConflictFilter::default())
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, conflict.id);
}

#[tokio::test]
async fn test_room_double_booking_is_recorded() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (master, periods, class_a) = seed_class(&repo, tenant, "7A").await;
    let class_b = create_class_timetable(&repo, &class_spec(tenant, master.id, "8B"))
        .await
        .unwrap();
    let period_id = grid_period(&periods, 4.0).id;

    let mut first = entry_spec(tenant, class_a.id, period_id, DayOfWeek::Wednesday, "Maths");
    first.room_number = Some("Lab-1".to_string());
    place_schedule_entry(&repo, &first).await.unwrap();

    let mut second = entry_spec(
        tenant,
        class_b.id,
        period_id,
        DayOfWeek::Wednesday,
        "Chemistry",
    );
    second.room_number = Some("Lab-1".to_string());
    let outcome = place_schedule_entry(&repo, &second).await.unwrap();

    assert_eq!(outcome.conflicts.len(), 1);
    let conflict = &outcome.conflicts[0];
    assert_eq!(conflict.conflict_type, ConflictType::RoomConflict);
    assert_eq!(conflict.severity, ConflictSeverity::Medium);
    assert_eq!(conflict.room_number.as_deref(), Some("Lab-1"));
}

#[tokio::test]
async fn test_update_entry_moves_it_to_a_free_cell() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;
    let period_id = grid_period(&periods, 1.0).id;

    let spec = entry_spec(tenant, class.id, period_id, DayOfWeek::Monday, "Maths");
    let placed = place_schedule_entry(&repo, &spec).await.unwrap();

    let changes = ScheduleEntryUpdate {
        day_of_week: Some(DayOfWeek::Thursday),
        room_number: Some("R204".to_string()),
        ..Default::default()
    };
    let outcome = update_schedule_entry(&repo, tenant, placed.entry.id, &changes)
        .await
        .unwrap();

    assert_eq!(outcome.entry.id, placed.entry.id);
    assert_eq!(outcome.entry.day_of_week, DayOfWeek::Thursday);
    assert_eq!(outcome.entry.room_number.as_deref(), Some("R204"));
    assert!(outcome.conflicts.is_empty());

    let monday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Monday)
        .await
        .unwrap();
    assert!(monday.is_empty());
    let thursday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Thursday)
        .await
        .unwrap();
    assert_eq!(thursday.len(), 1);
}

#[tokio::test]
async fn test_update_onto_occupied_cell_is_rejected() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;
    let period_id = grid_period(&periods, 1.0).id;

    place_schedule_entry(
        &repo,
        &entry_spec(tenant, class.id, period_id, DayOfWeek::Monday, "Maths"),
    )
    .await
    .unwrap();
    let movable = place_schedule_entry(
        &repo,
        &entry_spec(tenant, class.id, period_id, DayOfWeek::Tuesday, "Physics"),
    )
    .await
    .unwrap();

    let changes = ScheduleEntryUpdate {
        day_of_week: Some(DayOfWeek::Monday),
        ..Default::default()
    };
    let err = update_schedule_entry(&repo, tenant, movable.entry.id, &changes)
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(
        err.message(),
        "An active schedule entry already occupies the target class cell"
    );

    // The entry stayed where it was.
    let tuesday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Tuesday)
        .await
        .unwrap();
    assert_eq!(tuesday.len(), 1);
    assert_eq!(tuesday[0].subject_name, "Physics");
}

#[tokio::test]
async fn test_soft_delete_removes_entry_from_views() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    let placed = place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 1.0).id,
            DayOfWeek::Monday,
            "Maths",
        ),
    )
    .await
    .unwrap();

    let deleted = delete_schedule_entry(&repo, tenant, placed.entry.id, false)
        .await
        .unwrap();
    assert!(deleted.is_deleted);
    assert!(!deleted.is_active);

    let monday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Monday)
        .await
        .unwrap();
    assert!(monday.is_empty());

    // Deleting the same entry again is NotFound.
    let err = delete_schedule_entry(&repo, tenant, placed.entry.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    // And the vacated cell accepts a new placement.
    let again = place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 1.0).id,
            DayOfWeek::Monday,
            "History",
        ),
    )
    .await;
    assert!(again.is_ok());
}

#[tokio::test]
async fn test_bulk_create_isolates_row_failures() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    let rows = vec![
        BulkEntryRow {
            class_timetable_id: Some(class.id),
            period_id: Some(grid_period(&periods, 1.0).id),
            day_of_week: Some(DayOfWeek::Monday),
            subject_name: Some("Maths".to_string()),
            ..Default::default()
        },
        // Missing subject_name.
        BulkEntryRow {
            class_timetable_id: Some(class.id),
            period_id: Some(grid_period(&periods, 2.0).id),
            day_of_week: Some(DayOfWeek::Monday),
            ..Default::default()
        },
        // Unknown class binding.
        BulkEntryRow {
            class_timetable_id: Some(ClassTimetableId::generate()),
            period_id: Some(grid_period(&periods, 3.0).id),
            day_of_week: Some(DayOfWeek::Monday),
            subject_name: Some("Physics".to_string()),
            ..Default::default()
        },
    ];

    let result = bulk_create_schedule_entries(&repo, tenant, &rows)
        .await
        .unwrap();

    assert_eq!(result.status, BulkStatus::CompletedWithErrors);
    assert_eq!(result.total, 3);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 2);
    assert!(result.batch_id.is_some());

    assert_eq!(result.errors[0].row, 2);
    assert_eq!(
        result.errors[0].message,
        "Row 2: Missing required field 'subject_name'"
    );
    assert_eq!(result.errors[1].row, 3);
    assert!(result.errors[1].message.contains("not found or inactive"));

    // The good row landed.
    let monday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Monday)
        .await
        .unwrap();
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].subject_name, "Maths");
}

#[tokio::test]
async fn test_bulk_create_replaces_occupied_cells() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;
    let period_id = grid_period(&periods, 1.0).id;

    let placed = place_schedule_entry(
        &repo,
        &entry_spec(tenant, class.id, period_id, DayOfWeek::Monday, "Maths"),
    )
    .await
    .unwrap();

    let rows = vec![BulkEntryRow {
        class_timetable_id: Some(class.id),
        period_id: Some(period_id),
        day_of_week: Some(DayOfWeek::Monday),
        subject_name: Some("Physics".to_string()),
        ..Default::default()
    }];
    let result = bulk_create_schedule_entries(&repo, tenant, &rows)
        .await
        .unwrap();

    assert_eq!(result.status, BulkStatus::Completed);
    assert_eq!(result.successful, 1);

    // The occupant was updated in place, keeping its identity.
    let monday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Monday)
        .await
        .unwrap();
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].subject_name, "Physics");
    assert_eq!(monday[0].schedule_entry_id, placed.entry.id);
}

#[tokio::test]
async fn test_bulk_update_isolates_row_failures() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    let placed = place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 1.0).id,
            DayOfWeek::Monday,
            "Maths",
        ),
    )
    .await
    .unwrap();

    let rows = vec![
        BulkUpdateRow {
            schedule_entry_id: Some(placed.entry.id),
            changes: ScheduleEntryUpdate {
                notes: Some("Bring calculators".to_string()),
                ..Default::default()
            },
        },
        BulkUpdateRow {
            schedule_entry_id: None,
            changes: ScheduleEntryUpdate::default(),
        },
        BulkUpdateRow {
            schedule_entry_id: Some(ScheduleEntryId::generate()),
            changes: ScheduleEntryUpdate::default(),
        },
    ];

    let result = bulk_update_schedule_entries(&repo, tenant, &rows)
        .await
        .unwrap();

    assert_eq!(result.status, BulkStatus::CompletedWithErrors);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 2);
    assert!(result.batch_id.is_none());
    assert_eq!(
        result.errors[0].message,
        "Row 2: Missing required field 'schedule_entry_id'"
    );
    assert!(result.errors[1].message.contains("not found"));

    let monday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Monday)
        .await
        .unwrap();
    assert_eq!(monday[0].notes.as_deref(), Some("Bring calculators"));
}

#[tokio::test]
async fn test_bulk_delete_reports_unknown_entries() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    let first = place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 1.0).id,
            DayOfWeek::Monday,
            "Maths",
        ),
    )
    .await
    .unwrap();
    let second = place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 2.0).id,
            DayOfWeek::Monday,
            "Physics",
        ),
    )
    .await
    .unwrap();

    let ids = vec![
        first.entry.id,
        second.entry.id,
        ScheduleEntryId::generate(),
    ];
    let result = bulk_delete_schedule_entries(&repo, tenant, &ids, false)
        .await
        .unwrap();

    assert_eq!(result.status, BulkStatus::CompletedWithErrors);
    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors[0].row, 3);

    let monday = get_class_daily_schedule(&repo, tenant, class.id, DayOfWeek::Monday)
        .await
        .unwrap();
    assert!(monday.is_empty());
}

#[tokio::test]
async fn test_class_weekly_schedule() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    // Placed out of order; the view sorts by period number.
    place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 2.0).id,
            DayOfWeek::Monday,
            "Physics",
        ),
    )
    .await
    .unwrap();
    place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 1.0).id,
            DayOfWeek::Monday,
            "Maths",
        ),
    )
    .await
    .unwrap();
    place_schedule_entry(
        &repo,
        &entry_spec(
            tenant,
            class.id,
            grid_period(&periods, 1.0).id,
            DayOfWeek::Friday,
            "Art",
        ),
    )
    .await
    .unwrap();

    let week = get_class_weekly_schedule(&repo, tenant, class.class_id, YEAR)
        .await
        .unwrap();

    assert_eq!(week.academic_year, YEAR);
    // Every day of the week is keyed, empty or not.
    assert_eq!(week.days.len(), 7);
    assert!(week.days[&DayOfWeek::Sunday].is_empty());

    let monday = &week.days[&DayOfWeek::Monday];
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0].subject_name, "Maths");
    assert_eq!(monday[1].subject_name, "Physics");
    assert_eq!(monday[0].teacher_name.as_deref(), Some("A. Verma"));
    assert_eq!(monday[0].period_name, "Period 1");
    assert_eq!(monday[0].start_time, t(9, 0));

    assert_eq!(week.days[&DayOfWeek::Friday].len(), 1);

    // Unknown class for the year.
    let err = get_class_weekly_schedule(&repo, tenant, ClassId::generate(), YEAR)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_teacher_weekly_schedule_carries_class_labels() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (master, periods, class_a) = seed_class(&repo, tenant, "7A").await;
    let class_b = create_class_timetable(&repo, &class_spec(tenant, master.id, "8B"))
        .await
        .unwrap();
    let teacher = seed_teacher(&repo, tenant, master.id, "A. Verma").await;

    let mut first = entry_spec(
        tenant,
        class_a.id,
        grid_period(&periods, 1.0).id,
        DayOfWeek::Monday,
        "Maths",
    );
    first.teacher_timetable_id = Some(teacher.id);
    place_schedule_entry(&repo, &first).await.unwrap();

    let mut second = entry_spec(
        tenant,
        class_b.id,
        grid_period(&periods, 2.0).id,
        DayOfWeek::Monday,
        "Maths",
    );
    second.teacher_timetable_id = Some(teacher.id);
    place_schedule_entry(&repo, &second).await.unwrap();

    let week = get_teacher_weekly_schedule(&repo, tenant, teacher.teacher_id, YEAR)
        .await
        .unwrap();

    let monday = &week.days[&DayOfWeek::Monday];
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0].class_name.as_deref(), Some("7A"));
    assert_eq!(monday[1].class_name.as_deref(), Some("8B"));

    let err = get_teacher_weekly_schedule(&repo, tenant, TeacherId::generate(), YEAR)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_resolve_conflict_lifecycle() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (master, periods, class_a) = seed_class(&repo, tenant, "7A").await;
    let class_b = create_class_timetable(&repo, &class_spec(tenant, master.id, "8B"))
        .await
        .unwrap();
    let teacher = seed_teacher(&repo, tenant, master.id, "A. Verma").await;
    let period_id = grid_period(&periods, 1.0).id;

    let mut first = entry_spec(tenant, class_a.id, period_id, DayOfWeek::Monday, "Maths");
    first.teacher_timetable_id = Some(teacher.id);
    place_schedule_entry(&repo, &first).await.unwrap();
    let mut second = entry_spec(tenant, class_b.id, period_id, DayOfWeek::Monday, "Physics");
    second.teacher_timetable_id = Some(teacher.id);
    let outcome = place_schedule_entry(&repo, &second).await.unwrap();
    let conflict_id = outcome.conflicts[0].id;

    // Blank resolver is rejected up front.
    let err = resolve_conflict(&repo, tenant, conflict_id, "  ", None)
        .await
        .unwrap_err();
    assert_eq!(err.message(), "resolved_by must not be empty");

    let resolved = resolve_conflict(
        &repo,
        tenant,
        conflict_id,
        "coordinator",
        Some("Moved 8B to period 3"),
    )
    .await
    .unwrap();
    assert!(resolved.is_resolved);
    assert_eq!(resolved.resolved_by.as_deref(), Some("coordinator"));
    assert_eq!(
        resolved.resolution_notes.as_deref(),
        Some("Moved 8B to period 3")
    );
    assert!(resolved.resolved_date.is_some());

    // Gone from the default (unresolved) listing, still visible otherwise.
    let open = get_conflicts(&repo, tenant, &ConflictFilter::default())
        .await
        .unwrap();
    assert!(open.is_empty());
    let all = get_conflicts(
        &repo,
        tenant,
        &ConflictFilter {
            unresolved_only: false,
            severity: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 1);

    let err = resolve_conflict(&repo, tenant, conflict_id, "coordinator", None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert!(err.message().contains("already resolved"));
}

#[tokio::test]
async fn test_timetable_analytics() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (master, periods, class_a) = seed_class(&repo, tenant, "7A").await;
    let class_b = create_class_timetable(&repo, &class_spec(tenant, master.id, "8B"))
        .await
        .unwrap();
    let teacher = seed_teacher(&repo, tenant, master.id, "A. Verma").await;
    let p1 = grid_period(&periods, 1.0).id;
    let p2 = grid_period(&periods, 2.0).id;

    let mut e1 = entry_spec(tenant, class_a.id, p1, DayOfWeek::Monday, "Maths");
    e1.teacher_timetable_id = Some(teacher.id);
    e1.room_number = Some("R101".to_string());
    place_schedule_entry(&repo, &e1).await.unwrap();

    // Same teacher, same cell, different class and room: one teacher
    // double-booking, no room conflict.
    let mut e2 = entry_spec(tenant, class_b.id, p1, DayOfWeek::Monday, "Physics");
    e2.teacher_timetable_id = Some(teacher.id);
    e2.room_number = Some("R102".to_string());
    place_schedule_entry(&repo, &e2).await.unwrap();

    let mut e3 = entry_spec(tenant, class_a.id, p2, DayOfWeek::Tuesday, "Maths");
    e3.teacher_timetable_id = Some(teacher.id);
    e3.room_number = Some("R101".to_string());
    place_schedule_entry(&repo, &e3).await.unwrap();

    let stats = get_timetable_analytics(&repo, tenant, YEAR).await.unwrap();

    assert_eq!(stats.total_master_timetables, 1);
    assert_eq!(stats.total_class_timetables, 2);
    assert_eq!(stats.total_teacher_timetables, 1);
    assert_eq!(stats.total_schedule_entries, 3);
    assert_eq!(stats.total_conflicts, 1);
    assert_eq!(stats.unresolved_conflicts, 1);
    assert_eq!(stats.unique_rooms_used, 2);
    assert_eq!(stats.unique_subjects, 2);
    assert_eq!(stats.average_teacher_periods, 3.0);
    assert_eq!(stats.max_teacher_periods, 3);
    assert_eq!(stats.min_teacher_periods, 3);
    assert_eq!(stats.conflict_resolution_rate, 0.0);
}

#[tokio::test]
async fn test_room_utilization_against_grid_capacity() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;

    let mut e1 = entry_spec(
        tenant,
        class.id,
        grid_period(&periods, 1.0).id,
        DayOfWeek::Monday,
        "Biology",
    );
    e1.room_number = Some("Lab-1".to_string());
    place_schedule_entry(&repo, &e1).await.unwrap();
    let mut e2 = entry_spec(
        tenant,
        class.id,
        grid_period(&periods, 2.0).id,
        DayOfWeek::Tuesday,
        "Chemistry",
    );
    e2.room_number = Some("Lab-1".to_string());
    place_schedule_entry(&repo, &e2).await.unwrap();

    let usage = get_room_utilization(&repo, tenant, "Lab-1", YEAR)
        .await
        .unwrap();

    // 5 working days x 8 teaching periods.
    assert_eq!(usage.possible_slots, 40);
    assert_eq!(usage.scheduled_slots, 2);
    assert_eq!(usage.utilization_percent, 5.0);

    let unused = get_room_utilization(&repo, tenant, "Lab-9", YEAR)
        .await
        .unwrap();
    assert_eq!(unused.scheduled_slots, 0);
    assert_eq!(unused.utilization_percent, 0.0);
}

#[tokio::test]
async fn test_teacher_workload_flags_days_over_limit() {
    let repo = LocalRepository::new();
    let tenant = TenantId::generate();
    let (master, periods, class) = seed_class(&repo, tenant, "7A").await;

    let mut spec = teacher_spec(tenant, master.id, "S. Iyer");
    spec.max_periods_per_day = 1;
    spec.total_periods_per_week = 10;
    let teacher = create_teacher_timetable(&repo, &spec).await.unwrap();

    for (number, day) in [
        (1.0, DayOfWeek::Monday),
        (2.0, DayOfWeek::Monday),
        (1.0, DayOfWeek::Friday),
    ] {
        let mut entry = entry_spec(
            tenant,
            class.id,
            grid_period(&periods, number).id,
            day,
            "Maths",
        );
        entry.teacher_timetable_id = Some(teacher.id);
        place_schedule_entry(&repo, &entry).await.unwrap();
    }

    let load = get_teacher_workload(&repo, tenant, teacher.teacher_id, YEAR)
        .await
        .unwrap();

    assert_eq!(load.periods_per_day.len(), 7);
    assert_eq!(load.periods_per_day[&DayOfWeek::Monday], 2);
    assert_eq!(load.periods_per_day[&DayOfWeek::Friday], 1);
    assert_eq!(load.total_periods_assigned, 3);
    assert_eq!(load.days_over_limit, vec![DayOfWeek::Monday]);
    assert_eq!(load.utilization_percent, 30.0);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let repo = LocalRepository::new();
    let tenant_a = TenantId::generate();
    let tenant_b = TenantId::generate();

    let (master, periods, class) = seed_class(&repo, tenant_a, "7A").await;
    place_schedule_entry(
        &repo,
        &entry_spec(
            tenant_a,
            class.id,
            grid_period(&periods, 1.0).id,
            DayOfWeek::Monday,
            "Maths",
        ),
    )
    .await
    .unwrap();

    // Another tenant sees none of it.
    let err = get_period_grid(&repo, tenant_b, master.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let listed = list_master_timetables(&repo, tenant_b, &MasterTimetableFilter::default())
        .await
        .unwrap();
    assert!(listed.is_empty());

    let stats = get_timetable_analytics(&repo, tenant_b, YEAR).await.unwrap();
    assert_eq!(stats.total_schedule_entries, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_placements_admit_one_winner() {
    let repo = Arc::new(LocalRepository::new());
    let tenant = TenantId::generate();
    let (_, periods, class) = seed_class(&repo, tenant, "7A").await;
    let period_id = grid_period(&periods, 1.0).id;

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = Arc::clone(&repo);
        let spec = entry_spec(
            tenant,
            class.id,
            period_id,
            DayOfWeek::Monday,
            &format!("Subject {}", i),
        );
        handles.push(tokio::spawn(async move {
            place_schedule_entry(repo.as_ref(), &spec).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => {
                assert!(matches!(err, RepositoryError::ValidationError { .. }));
            }
        }
    }
    assert_eq!(successes, 1);

    let monday = get_class_daily_schedule(repo.as_ref(), tenant, class.id, DayOfWeek::Monday)
        .await
        .unwrap();
    assert_eq!(monday.len(), 1);
}
