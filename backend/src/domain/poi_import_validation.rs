//! Validation of raw import requests.
//!
//! Every violation is collected, then reported as one `invalid_request`
//! error whose `details.issues` lists `{field, code, message}` entries.

use serde::Serialize;
use serde_json::json;

use super::Error;
use super::geo::{Coordinates, NORWAY_BOUNDS};
use super::place_type::PlaceType;
use super::ports::{ImportMode, PoiImportRequest};

/// Smallest accepted search radius in metres.
pub const MIN_RADIUS_M: i64 = 300;
/// Largest accepted search radius in metres.
pub const MAX_RADIUS_M: i64 = 2_000;
/// Most place types a single request may ask for.
pub const MAX_CATEGORIES: usize = 20;

/// Import request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedImportRequest {
    /// Search center, inside Norway.
    pub center: Coordinates,
    /// Search radius in metres.
    pub radius_m: u32,
    /// Requested place types, deduplicated in request order.
    pub place_types: Vec<PlaceType>,
    /// Whether to query Entur.
    pub include_entur: bool,
    /// Whether to query Bysykkel.
    pub include_bysykkel: bool,
    /// Project to link written POIs to.
    pub project_id: Option<String>,
    /// Preview or commit.
    pub mode: ImportMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum IssueCode {
    MissingField,
    OutOfRange,
    TooFew,
    TooMany,
    UnsupportedValue,
    Blank,
    InvalidType,
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ValidationIssue {
    field: String,
    code: IssueCode,
    message: String,
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, field: impl Into<String>, code: IssueCode, message: impl Into<String>) {
        let field = field.into();
        // A mistyped field already explains why the value is absent.
        if code == IssueCode::MissingField
            && self
                .0
                .iter()
                .any(|issue| issue.field == field && issue.code == IssueCode::InvalidType)
        {
            return;
        }
        self.0.push(ValidationIssue {
            field,
            code,
            message: message.into(),
        });
    }

    fn into_error(self) -> Error {
        let count = self.0.len();
        Error::invalid_request(format!("import request has {count} invalid field(s)"))
            .with_details(json!({ "issues": self.0 }))
    }
}

/// Check `request` and convert it into a [`ValidatedImportRequest`].
///
/// # Examples
/// ```
/// use placy::domain::geo::Coordinates;
/// use placy::domain::ports::PoiImportRequest;
/// use placy::domain::poi_import_validation::validate_import_request;
///
/// let request = PoiImportRequest {
///     center: Some(Coordinates::new(63.4305, 10.3951)),
///     radius_meters: Some(250),
///     categories: Some(vec!["cafe".into()]),
///     ..PoiImportRequest::default()
/// };
/// let error = validate_import_request(request).unwrap_err();
/// assert_eq!(error.details().unwrap()["issues"][0]["field"], "radiusMeters");
/// ```
pub fn validate_import_request(
    request: PoiImportRequest,
) -> Result<ValidatedImportRequest, Error> {
    let mut issues = Issues::default();
    for mistyped in request.mistyped_fields {
        issues.push(mistyped.field, IssueCode::InvalidType, mistyped.message);
    }

    let center = validate_center(request.center, &mut issues);
    let radius_m = validate_radius(request.radius_meters, &mut issues);
    let place_types = validate_categories(request.categories, &mut issues);
    let project_id = validate_project_id(request.project_id, &mut issues);

    match (center, radius_m, place_types) {
        (Some(center), Some(radius_m), Some(place_types)) if issues.0.is_empty() => {
            Ok(ValidatedImportRequest {
                center,
                radius_m,
                place_types,
                include_entur: request.include_entur,
                include_bysykkel: request.include_bysykkel,
                project_id,
                mode: if request.preview {
                    ImportMode::Preview
                } else {
                    ImportMode::Commit
                },
            })
        }
        _ => Err(issues.into_error()),
    }
}

fn validate_center(center: Option<Coordinates>, issues: &mut Issues) -> Option<Coordinates> {
    let Some(center) = center else {
        issues.push("center", IssueCode::MissingField, "center is required");
        return None;
    };
    let lat_ok = center.lat.is_finite()
        && (NORWAY_BOUNDS.min_lat..=NORWAY_BOUNDS.max_lat).contains(&center.lat);
    let lng_ok = center.lng.is_finite()
        && (NORWAY_BOUNDS.min_lng..=NORWAY_BOUNDS.max_lng).contains(&center.lng);
    if !lat_ok {
        issues.push(
            "center.lat",
            IssueCode::OutOfRange,
            format!(
                "latitude must be between {} and {}",
                NORWAY_BOUNDS.min_lat, NORWAY_BOUNDS.max_lat
            ),
        );
    }
    if !lng_ok {
        issues.push(
            "center.lng",
            IssueCode::OutOfRange,
            format!(
                "longitude must be between {} and {}",
                NORWAY_BOUNDS.min_lng, NORWAY_BOUNDS.max_lng
            ),
        );
    }
    (lat_ok && lng_ok).then_some(center)
}

fn validate_radius(radius: Option<i64>, issues: &mut Issues) -> Option<u32> {
    let Some(radius) = radius else {
        issues.push("radiusMeters", IssueCode::MissingField, "radiusMeters is required");
        return None;
    };
    if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&radius) {
        issues.push(
            "radiusMeters",
            IssueCode::OutOfRange,
            format!("radiusMeters must be between {MIN_RADIUS_M} and {MAX_RADIUS_M}"),
        );
        return None;
    }
    u32::try_from(radius).ok()
}

fn validate_categories(
    categories: Option<Vec<String>>,
    issues: &mut Issues,
) -> Option<Vec<PlaceType>> {
    let Some(categories) = categories else {
        issues.push("categories", IssueCode::MissingField, "categories is required");
        return None;
    };
    if categories.is_empty() {
        issues.push(
            "categories",
            IssueCode::TooFew,
            "categories must contain at least one place type",
        );
        return None;
    }
    if categories.len() > MAX_CATEGORIES {
        issues.push(
            "categories",
            IssueCode::TooMany,
            format!("categories may contain at most {MAX_CATEGORIES} place types"),
        );
        return None;
    }

    let before = issues.0.len();
    let mut place_types = Vec::with_capacity(categories.len());
    for (index, raw) in categories.iter().enumerate() {
        match raw.parse::<PlaceType>() {
            Ok(kind) if !place_types.contains(&kind) => place_types.push(kind),
            Ok(_) => {}
            Err(err) => issues.push(
                format!("categories[{index}]"),
                IssueCode::UnsupportedValue,
                err.to_string(),
            ),
        }
    }
    (issues.0.len() == before).then_some(place_types)
}

fn validate_project_id(project_id: Option<String>, issues: &mut Issues) -> Option<String> {
    let project_id = project_id?;
    let trimmed = project_id.trim();
    if trimmed.is_empty() {
        issues.push("projectId", IssueCode::Blank, "projectId must not be blank");
        return None;
    }
    Some(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MistypedField;
    use rstest::{fixture, rstest};
    use serde_json::Value;

    #[fixture]
    fn trondheim_cafes() -> PoiImportRequest {
        PoiImportRequest {
            center: Some(Coordinates::new(63.4305, 10.3951)),
            radius_meters: Some(1_000),
            categories: Some(vec!["cafe".to_owned()]),
            ..PoiImportRequest::default()
        }
    }

    fn issues(error: &Error) -> Vec<(String, String)> {
        error
            .details()
            .and_then(|details| details.get("issues"))
            .and_then(Value::as_array)
            .map(|issues| {
                issues
                    .iter()
                    .map(|issue| {
                        (
                            issue["field"].as_str().unwrap_or_default().to_owned(),
                            issue["code"].as_str().unwrap_or_default().to_owned(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[rstest]
    fn accepts_a_well_formed_request(trondheim_cafes: PoiImportRequest) {
        let validated = validate_import_request(trondheim_cafes).expect("valid request");

        assert_eq!(validated.radius_m, 1_000);
        assert_eq!(validated.place_types, vec![PlaceType::Cafe]);
        assert_eq!(validated.mode, ImportMode::Commit);
        assert!(validated.include_entur && validated.include_bysykkel);
    }

    #[rstest]
    #[case(299, false)]
    #[case(300, true)]
    #[case(250, false)]
    #[case(2_000, true)]
    #[case(2_001, false)]
    fn enforces_radius_bounds(
        mut trondheim_cafes: PoiImportRequest,
        #[case] radius: i64,
        #[case] accepted: bool,
    ) {
        trondheim_cafes.radius_meters = Some(radius);
        let result = validate_import_request(trondheim_cafes);
        assert_eq!(result.is_ok(), accepted);
        if let Err(error) = result {
            assert_eq!(
                issues(&error),
                vec![("radiusMeters".to_owned(), "out_of_range".to_owned())]
            );
        }
    }

    #[rstest]
    #[case::south_of_norway(Coordinates::new(55.6761, 12.5683), "center.lat")]
    #[case::west_of_norway(Coordinates::new(60.0, 2.0), "center.lng")]
    fn rejects_centers_outside_norway(
        mut trondheim_cafes: PoiImportRequest,
        #[case] center: Coordinates,
        #[case] field: &str,
    ) {
        trondheim_cafes.center = Some(center);
        let error = validate_import_request(trondheim_cafes).expect_err("outside Norway");
        assert_eq!(issues(&error), vec![(field.to_owned(), "out_of_range".to_owned())]);
    }

    #[rstest]
    fn rejects_unknown_and_empty_categories(mut trondheim_cafes: PoiImportRequest) {
        trondheim_cafes.categories = Some(vec!["cafe".into(), "casino".into()]);
        let error = validate_import_request(trondheim_cafes.clone()).expect_err("casino");
        assert_eq!(
            issues(&error),
            vec![("categories[1]".to_owned(), "unsupported_value".to_owned())]
        );

        trondheim_cafes.categories = Some(Vec::new());
        let error = validate_import_request(trondheim_cafes).expect_err("empty");
        assert_eq!(
            issues(&error),
            vec![("categories".to_owned(), "too_few".to_owned())]
        );
    }

    #[rstest]
    fn rejects_more_than_twenty_categories(mut trondheim_cafes: PoiImportRequest) {
        trondheim_cafes.categories = Some(vec!["cafe".to_owned(); MAX_CATEGORIES + 1]);
        let error = validate_import_request(trondheim_cafes).expect_err("too many");
        assert_eq!(
            issues(&error),
            vec![("categories".to_owned(), "too_many".to_owned())]
        );
    }

    #[rstest]
    fn repeated_categories_are_deduplicated(mut trondheim_cafes: PoiImportRequest) {
        trondheim_cafes.categories = Some(vec!["cafe".into(), "bar".into(), "cafe".into()]);
        let validated = validate_import_request(trondheim_cafes).expect("valid request");
        assert_eq!(validated.place_types, vec![PlaceType::Cafe, PlaceType::Bar]);
    }

    #[rstest]
    fn reports_every_issue_at_once() {
        let request = PoiImportRequest {
            project_id: Some("   ".to_owned()),
            ..PoiImportRequest::default()
        };

        let error = validate_import_request(request).expect_err("empty request");

        let fields: Vec<String> = issues(&error).into_iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["center", "radiusMeters", "categories", "projectId"]);
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn mistyped_fields_are_reported_instead_of_missing(mut trondheim_cafes: PoiImportRequest) {
        trondheim_cafes.radius_meters = None;
        trondheim_cafes.include_entur = true;
        trondheim_cafes.mistyped_fields = vec![
            MistypedField {
                field: "radiusMeters".to_owned(),
                message: "invalid type: string \"far\", expected i64".to_owned(),
            },
            MistypedField {
                field: "includeEntur".to_owned(),
                message: "invalid type: string \"yes\", expected a boolean".to_owned(),
            },
        ];

        let error = validate_import_request(trondheim_cafes).expect_err("mistyped fields");

        assert_eq!(
            issues(&error),
            vec![
                ("radiusMeters".to_owned(), "invalid_type".to_owned()),
                ("includeEntur".to_owned(), "invalid_type".to_owned()),
            ]
        );
    }

    #[rstest]
    fn preview_flag_selects_preview_mode(mut trondheim_cafes: PoiImportRequest) {
        trondheim_cafes.preview = true;
        trondheim_cafes.project_id = Some(" proj-1 ".to_owned());
        let validated = validate_import_request(trondheim_cafes).expect("valid request");
        assert_eq!(validated.mode, ImportMode::Preview);
        assert_eq!(validated.project_id.as_deref(), Some("proj-1"));
    }
}
