//! Integration tests for import, storage and export against the SQLite backend.

use chrono::{TimeZone, Utc};
use fee_core::calculations::calculate_with;
use fee_core::tables::ConstructionTypeTable;
use fee_core::{Discipline, ProjectRepository, calculate};
use fee_data::{ConstructionTypeLoader, WorkspaceExport, parse_projects};
use fee_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const TEST_TYPES_CSV: &str = include_str!("../test-data/construction_types.csv");
const TEST_BUNDLE: &str = include_str!("../test-data/workspace_bundle.json");

async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

fn import_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap()
}

/// Saves in reverse so the first imported project ends up first in the list.
async fn import_bundle(repo: &SqliteRepository) -> Vec<String> {
    let projects = parse_projects(TEST_BUNDLE, Discipline::Structural, import_time())
        .expect("Failed to parse bundle");
    for project in projects.iter().rev() {
        repo.save_project(project).await.expect("Failed to save project");
    }
    projects.into_iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_imported_projects_split_by_discipline() {
    let repo = setup_test_db().await;
    let ids = import_bundle(&repo).await;

    let structural = repo.list_projects(Discipline::Structural, true).await.unwrap();
    let architectural = repo.list_projects(Discipline::Architectural, false).await.unwrap();
    let architectural_all = repo.list_projects(Discipline::Architectural, true).await.unwrap();

    assert_eq!(
        structural.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec![ids[0].as_str(), ids[2].as_str()]
    );
    assert!(architectural.is_empty(), "archived project should be hidden");
    assert_eq!(architectural_all.len(), 1);
    assert_eq!(architectural_all[0].id, "1759226500000");
    assert_eq!(architectural_all[0].name, "Жилищна сграда Кършияка");
    assert_eq!(structural[1].name, "Без име");
}

#[tokio::test]
async fn test_stored_projects_calculate() {
    let repo = setup_test_db().await;
    let ids = import_bundle(&repo).await;

    let house = repo.get_project(&ids[0]).await.unwrap().form_state().unwrap();
    let wall = repo.get_project(&ids[2]).await.unwrap().form_state().unwrap();
    let block = repo.get_project("1759226500000").await.unwrap().form_state().unwrap();

    assert_eq!(calculate(&house).total, dec!(810.00));
    assert_eq!(calculate(&wall).total, dec!(860.00));
    assert_eq!(calculate(&block).total, dec!(11736.00) / fee_core::EURO_RATE);
}

#[tokio::test]
async fn test_loaded_construction_types_replace_builtin_prices() {
    let repo = setup_test_db().await;
    let ids = import_bundle(&repo).await;
    let table = ConstructionTypeLoader::load(TEST_TYPES_CSV.as_bytes())
        .expect("Failed to load construction types");

    let house = repo.get_project(&ids[0]).await.unwrap().form_state().unwrap();
    let wall = repo.get_project(&ids[2]).await.unwrap().form_state().unwrap();

    assert_eq!(table.types().len(), 5);
    assert_ne!(&table, ConstructionTypeTable::builtin());
    assert_eq!(calculate_with(&house, &table).total, dec!(900.00));
    assert_eq!(calculate_with(&wall, &table).total, dec!(980.00));
}

#[tokio::test]
async fn test_codes_missing_from_loaded_table_fail_closed() {
    let table = ConstructionTypeLoader::load(TEST_TYPES_CSV.as_bytes()).unwrap();
    let form = fee_core::FormState::from_value(
        Discipline::Structural,
        serde_json::json!({ "projectType": "XI.1", "area": 900 }),
    )
    .unwrap();

    let with_custom = calculate_with(&form, &table);

    assert!(!with_custom.error);
    assert_eq!(with_custom.total, Decimal::ZERO);
    assert_eq!(with_custom.hints.len(), 1);
    assert!(calculate(&form).total > Decimal::ZERO);
}

#[tokio::test]
async fn test_workspace_export_round_trips_through_store() {
    let repo = setup_test_db().await;
    import_bundle(&repo).await;
    let mut stored = repo.list_projects(Discipline::Structural, true).await.unwrap();
    stored.extend(repo.list_projects(Discipline::Architectural, true).await.unwrap());

    let json = WorkspaceExport::new("Бюро Пловдив", stored.clone(), import_time())
        .to_json()
        .unwrap();
    repo.clear_projects(Discipline::Structural).await.unwrap();
    repo.clear_projects(Discipline::Architectural).await.unwrap();

    let reimported = parse_projects(&json, Discipline::Architectural, import_time()).unwrap();

    assert_eq!(reimported, stored);
}
