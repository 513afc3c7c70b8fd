//! Behavioural coverage for import orchestration.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::geo::Coordinates;
use crate::domain::place_type::{PlaceType, TransitMode, bike_category};
use crate::domain::poi::{ExistingPoi, ExternalIds, WriteIntent};
use crate::domain::ports::{
    FixturePoiDiscoverySource, FixtureProjectLinkRepository, MockImportMetrics,
    MockPoiDiscoverySource, MockPoiRepository, MockProjectLinkRepository, PoiUpsertReport,
};

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        fixture_timestamp().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixture_timestamp()
    }
}

fn cafe(id: &str) -> DiscoveredPoi {
    DiscoveredPoi::new(
        ExternalIdKind::Google,
        id,
        format!("Kafe {id}"),
        Coordinates::new(63.4306, 10.3952),
        PlaceType::Cafe.category(),
    )
}

fn bus_stop() -> DiscoveredPoi {
    DiscoveredPoi::new(
        ExternalIdKind::Entur,
        "NSR:StopPlace:41613",
        "Prinsens gate",
        Coordinates::new(63.4312, 10.3921),
        TransitMode::Bus.category(),
    )
}

fn bike_station() -> DiscoveredPoi {
    DiscoveredPoi::new(
        ExternalIdKind::Bysykkel,
        "7",
        "Solsiden",
        Coordinates::new(63.4341, 10.4111),
        bike_category(),
    )
}

#[fixture]
fn request() -> PoiImportRequest {
    PoiImportRequest {
        center: Some(Coordinates::new(63.4305, 10.3951)),
        radius_meters: Some(1_000),
        categories: Some(vec!["cafe".to_owned()]),
        ..PoiImportRequest::default()
    }
}

fn fixed(pois: Vec<DiscoveredPoi>) -> Arc<dyn PoiDiscoverySource> {
    Arc::new(FixturePoiDiscoverySource::new(pois))
}

fn sources() -> DiscoverySources {
    DiscoverySources {
        google: Some(fixed(vec![cafe("a"), cafe("b")])),
        entur: fixed(vec![bus_stop()]),
        bysykkel: fixed(vec![bike_station()]),
    }
}

fn make_service(sources: DiscoverySources, pois: MockPoiRepository) -> PoiImportService {
    PoiImportService::new(
        sources,
        Arc::new(pois),
        Arc::new(FixtureProjectLinkRepository),
        Arc::new(FixtureClock),
    )
}

fn accept_all_writes(repo: &mut MockPoiRepository) {
    repo.expect_upsert_categories().returning(|_| Ok(()));
    repo.expect_upsert_pois().returning(|records| {
        Ok(PoiUpsertReport {
            written_ids: records.iter().map(|record| record.id.clone()).collect(),
            errors: Vec::new(),
        })
    });
}

#[rstest]
#[tokio::test]
async fn preview_reports_stats_without_writing(mut request: PoiImportRequest) {
    request.preview = true;
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box()
        .times(1)
        .withf(|bounds| bounds.contains(Coordinates::new(63.4305, 10.3951)))
        .returning(|_| Ok(Vec::new()));
    repo.expect_upsert_categories().times(0);
    repo.expect_upsert_pois().times(0);

    let outcome = make_service(sources(), repo)
        .import(request)
        .await
        .expect("preview succeeds");

    assert_eq!(outcome.mode, ImportMode::Preview);
    assert_eq!(outcome.stats.total, 4);
    assert_eq!(outcome.stats.new, 4);
    assert_eq!(outcome.stats.updated, 0);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.linked_to_project, None);
}

#[rstest]
#[tokio::test]
async fn commit_updates_matched_rows_under_their_existing_id(request: PoiImportRequest) {
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().returning(|_| {
        Ok(vec![ExistingPoi {
            id: "manual-7".to_owned(),
            external_ids: ExternalIds::single(ExternalIdKind::Google, "a"),
        }])
    });
    repo.expect_upsert_categories()
        .times(1)
        .withf(|categories| {
            let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
            ids == ["bike", "bus", "cafe"]
        })
        .returning(|_| Ok(()));
    repo.expect_upsert_pois()
        .times(1)
        .withf(|records| {
            records.len() == 4
                && records.iter().any(|r| r.id == "manual-7")
                && records.iter().all(|r| r.id != "google-a")
                && records.iter().all(|r| r.imported_at == fixture_timestamp())
                && records
                    .iter()
                    .all(|r| (r.id == "manual-7") == (r.intent == WriteIntent::Update))
        })
        .returning(|records| {
            Ok(PoiUpsertReport {
                written_ids: records.iter().map(|record| record.id.clone()).collect(),
                errors: Vec::new(),
            })
        });

    let outcome = make_service(sources(), repo)
        .import(request)
        .await
        .expect("commit succeeds");

    assert_eq!(outcome.mode, ImportMode::Commit);
    assert_eq!(outcome.stats.new, 3);
    assert_eq!(outcome.stats.updated, 1);
}

#[rstest]
#[tokio::test]
async fn provider_failure_is_reported_and_treated_as_empty(request: PoiImportRequest) {
    let mut entur = MockPoiDiscoverySource::new();
    entur
        .expect_discover()
        .times(1)
        .returning(|_| Err(PoiDiscoverySourceError::timeout("after 10s")));
    let sources = DiscoverySources {
        entur: Arc::new(entur),
        ..sources()
    };
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().returning(|_| Ok(Vec::new()));
    accept_all_writes(&mut repo);

    let outcome = make_service(sources, repo)
        .import(request)
        .await
        .expect("partial success");

    assert_eq!(outcome.stats.total, 3);
    assert_eq!(outcome.stats.by_category.get("bus"), None);
    assert_eq!(
        outcome.errors,
        vec!["entur discovery failed: request timed out: after 10s".to_owned()]
    );
}

#[rstest]
#[tokio::test]
async fn disabled_providers_are_not_called(mut request: PoiImportRequest) {
    request.include_entur = false;
    request.include_bysykkel = false;
    request.preview = true;
    let mut entur = MockPoiDiscoverySource::new();
    entur.expect_discover().times(0);
    let mut bysykkel = MockPoiDiscoverySource::new();
    bysykkel.expect_discover().times(0);
    let sources = DiscoverySources {
        google: Some(fixed(vec![cafe("a")])),
        entur: Arc::new(entur),
        bysykkel: Arc::new(bysykkel),
    };
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().returning(|_| Ok(Vec::new()));

    let outcome = make_service(sources, repo)
        .import(request)
        .await
        .expect("preview succeeds");

    assert_eq!(outcome.stats.total, 1);
}

#[rstest]
#[tokio::test]
async fn missing_google_key_fails_before_any_io(request: PoiImportRequest) {
    let mut entur = MockPoiDiscoverySource::new();
    entur.expect_discover().times(0);
    let sources = DiscoverySources {
        google: None,
        entur: Arc::new(entur),
        bysykkel: fixed(Vec::new()),
    };
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().times(0);

    let error = make_service(sources, repo)
        .import(request)
        .await
        .expect_err("google is required");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn invalid_requests_never_reach_providers(mut request: PoiImportRequest) {
    request.radius_meters = Some(2_001);
    let mut google = MockPoiDiscoverySource::new();
    google.expect_discover().times(0);
    let sources = DiscoverySources {
        google: Some(Arc::new(google)),
        ..sources()
    };
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().times(0);

    let error = make_service(sources, repo)
        .import(request)
        .await
        .expect_err("radius out of range");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::unreachable(PoiRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::broken_query(PoiRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn prefetch_failure_aborts_the_import(
    request: PoiImportRequest,
    #[case] failure: PoiRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box()
        .return_once(move |_| Err(failure));
    repo.expect_upsert_pois().times(0);

    let error = make_service(sources(), repo)
        .import(request)
        .await
        .expect_err("prefetch failure is fatal");

    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn row_failures_are_collected(request: PoiImportRequest) {
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().returning(|_| Ok(Vec::new()));
    repo.expect_upsert_categories().returning(|_| Ok(()));
    repo.expect_upsert_pois().returning(|records| {
        let mut report = PoiUpsertReport::default();
        for record in records {
            if record.id == "google-b" {
                report.push_error(&record.id, "duplicate key");
            } else {
                report.written_ids.push(record.id.clone());
            }
        }
        Ok(report)
    });

    let outcome = make_service(sources(), repo)
        .import(request)
        .await
        .expect("partial success");

    assert_eq!(outcome.errors, vec!["google-b: duplicate key".to_owned()]);
    assert_eq!(outcome.stats.total, 4);
}

#[rstest]
#[tokio::test]
async fn links_written_pois_to_the_project(mut request: PoiImportRequest) {
    request.project_id = Some("trondheim-sentrum".to_owned());
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().returning(|_| Ok(Vec::new()));
    accept_all_writes(&mut repo);
    let mut links = MockProjectLinkRepository::new();
    links
        .expect_link_pois()
        .times(1)
        .withf(|project_id, ids| project_id == "trondheim-sentrum" && ids.len() == 4)
        .returning(|_, _| Ok(()));

    let service = PoiImportService::new(
        sources(),
        Arc::new(repo),
        Arc::new(links),
        Arc::new(FixtureClock),
    );
    let outcome = service.import(request).await.expect("commit succeeds");

    assert_eq!(outcome.linked_to_project, Some(4));
}

#[rstest]
#[tokio::test]
async fn unknown_project_becomes_an_error_entry(mut request: PoiImportRequest) {
    request.project_id = Some("ghost".to_owned());
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().returning(|_| Ok(Vec::new()));
    accept_all_writes(&mut repo);
    let mut links = MockProjectLinkRepository::new();
    links
        .expect_link_pois()
        .returning(|project_id, _| Err(ProjectLinkRepositoryError::project_not_found(project_id)));

    let service = PoiImportService::new(
        sources(),
        Arc::new(repo),
        Arc::new(links),
        Arc::new(FixtureClock),
    );
    let outcome = service.import(request).await.expect("import still succeeds");

    assert_eq!(outcome.linked_to_project, Some(0));
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("ghost"));
}

#[rstest]
#[tokio::test]
async fn records_metrics_for_each_run(mut request: PoiImportRequest) {
    request.preview = true;
    let mut repo = MockPoiRepository::new();
    repo.expect_find_in_bounding_box().returning(|_| Ok(Vec::new()));
    let mut metrics = MockImportMetrics::new();
    metrics
        .expect_record_run()
        .times(1)
        .withf(|run| {
            run.mode == ImportMode::Preview
                && run.status == ImportRunStatus::Succeeded
                && run.new == 4
                && run.written == 0
        })
        .returning(|_| Ok(()));

    let service = make_service(sources(), repo).with_metrics(Arc::new(metrics));
    service.import(request).await.expect("preview succeeds");
}
