//! Tests for database module exports and service layer functions.

use tms_rust::db;

#[test]
fn test_db_module_has_service_functions() {
    // Verify all service functions are exported
    // These are compile-time checks - if this compiles, the exports work
    let _: fn() = || {
        // Just verify these symbols exist
        let _ = db::health_check::<db::repositories::LocalRepository>;
        let _ = db::create_master_timetable::<db::repositories::LocalRepository>;
        let _ = db::get_master_timetable::<db::repositories::LocalRepository>;
        let _ = db::get_period_grid::<db::repositories::LocalRepository>;
        let _ = db::list_master_timetables::<db::repositories::LocalRepository>;
        let _ = db::create_class_timetable::<db::repositories::LocalRepository>;
        let _ = db::create_teacher_timetable::<db::repositories::LocalRepository>;
        let _ = db::place_schedule_entry::<db::repositories::LocalRepository>;
        let _ = db::update_schedule_entry::<db::repositories::LocalRepository>;
        let _ = db::delete_schedule_entry::<db::repositories::LocalRepository>;
        let _ = db::bulk_create_schedule_entries::<db::repositories::LocalRepository>;
        let _ = db::bulk_update_schedule_entries::<db::repositories::LocalRepository>;
        let _ = db::bulk_delete_schedule_entries::<db::repositories::LocalRepository>;
        let _ = db::get_class_weekly_schedule::<db::repositories::LocalRepository>;
        let _ = db::get_teacher_weekly_schedule::<db::repositories::LocalRepository>;
        let _ = db::get_class_daily_schedule::<db::repositories::LocalRepository>;
        let _ = db::get_conflicts::<db::repositories::LocalRepository>;
        let _ = db::resolve_conflict::<db::repositories::LocalRepository>;
        let _ = db::get_timetable_analytics::<db::repositories::LocalRepository>;
        let _ = db::get_room_utilization::<db::repositories::LocalRepository>;
        let _ = db::get_teacher_workload::<db::repositories::LocalRepository>;
    };
}

#[test]
fn test_repository_config_can_be_created() {
    // Test that RepositoryConfig type is exported and is accessible
    use tms_rust::db::RepositoryConfig;

    let _: Option<RepositoryConfig> = None;
}

#[cfg(feature = "postgres-repo")]
#[test]
fn test_postgres_config_type_is_exported() {
    // Verify PostgresConfig is exported when feature is enabled
    use tms_rust::db::PostgresConfig;

    // This is a compile-time check
    let _: Option<PostgresConfig> = None;
}

#[cfg(feature = "postgres-repo")]
#[test]
fn test_pool_stats_type_is_exported() {
    // Verify PoolStats is exported when feature is enabled
    use tms_rust::db::PoolStats;

    // This is a compile-time check
    let _: Option<PoolStats> = None;
}

#[cfg(not(feature = "postgres-repo"))]
#[test]
fn test_postgres_config_fallback_exists() {
    // Verify PostgresConfig fallback type exists when feature is disabled
    use tms_rust::db::PostgresConfig;

    // This is a compile-time check
    let _: Option<PostgresConfig> = None;
}

#[cfg(not(feature = "postgres-repo"))]
#[test]
fn test_pool_stats_fallback_exists() {
    // Verify PoolStats fallback type exists when feature is disabled
    use tms_rust::db::PoolStats;

    let stats = PoolStats::default();
    // Just verify it can be created
    let _ = format!("{:?}", stats);
}

#[test]
fn test_repository_traits_are_exported() {
    use tms_rust::db::{
        AnalyticsRepository, AssignmentRepository, ConflictRepository, FullRepository,
        ScheduleEntryRepository, TimetableRepository,
    };

    fn assert_full<R: FullRepository + ?Sized>() {}
    fn assert_parts<
        R: TimetableRepository
            + AssignmentRepository
            + ScheduleEntryRepository
            + ConflictRepository
            + AnalyticsRepository
            + ?Sized,
    >() {
    }

    assert_full::<tms_rust::db::LocalRepository>();
    assert_parts::<tms_rust::db::LocalRepository>();
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_init_repository_local() {
    // The in-memory singleton initializes without external configuration;
    // calling it twice must be a no-op.
    let first = tms_rust::db::init_repository();
    let second = tms_rust::db::init_repository();
    assert!(first.is_ok());
    assert!(second.is_ok());

    let repo = tms_rust::db::get_repository().unwrap();
    assert!(repo.health_check().await.unwrap());
}
