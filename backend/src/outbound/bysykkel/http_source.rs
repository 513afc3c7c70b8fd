//! Reqwest-backed Bysykkel source reading one or more GBFS feeds.
//!
//! GBFS has no spatial query, so each feed is downloaded whole and filtered
//! by distance from the search center. Station ids are only unique within
//! one operator, so every id is prefixed with the feed's system key.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, Url};
use tracing::warn;

use super::dto::StationInformationDto;
use crate::domain::poi::DiscoveredPoi;
use crate::domain::ports::{DiscoveryQuery, PoiDiscoverySource, PoiDiscoverySourceError};
use crate::outbound::http_support::{map_transport_error, read_json};

const CLIENT_IDENTIFIER_HEADER: &str = "Client-Identifier";
const FALLBACK_SYSTEM: &str = "gbfs";

/// One `station_information.json` URL and the operator it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GbfsFeed {
    url: Url,
    system: String,
}

impl GbfsFeed {
    fn new(url: Url) -> Self {
        let system = system_key(&url);
        Self { url, system }
    }
}

/// Operator key for a feed: the path segment holding the feed file, such as
/// `trondheimbysykkel.no`, else the host.
fn system_key(url: &Url) -> String {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();
    match segments.as_slice() {
        [.., system, _file] => (*system).to_owned(),
        _ => url.host_str().unwrap_or(FALLBACK_SYSTEM).to_owned(),
    }
}

/// Bysykkel adapter over a fixed list of `station_information.json` URLs.
pub struct BysykkelGbfsSource {
    client: Client,
    feeds: Vec<GbfsFeed>,
    client_identifier: String,
}

impl BysykkelGbfsSource {
    /// Build an adapter with an explicit request timeout.
    ///
    /// An empty feed list yields a source that never finds anything.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        feeds: Vec<Url>,
        client_identifier: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            feeds: feeds.into_iter().map(GbfsFeed::new).collect(),
            client_identifier: client_identifier.into(),
        })
    }

    async fn fetch_feed(
        &self,
        feed: &GbfsFeed,
        query: &DiscoveryQuery,
    ) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
        let response = self
            .client
            .get(feed.url.clone())
            .header(CLIENT_IDENTIFIER_HEADER, self.client_identifier.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        let decoded: StationInformationDto = read_json("bysykkel", response).await?;
        Ok(decoded.into_domain_pois(&feed.system, query.center, query.radius_m))
    }
}

/// Stations from every feed that answered. Fails only when every feed failed.
fn merge_feed_results(
    results: Vec<(&GbfsFeed, Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError>)>,
) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
    let mut stations = Vec::new();
    let mut answered = false;
    let mut last_error = None;
    for (feed, result) in results {
        match result {
            Ok(found) => {
                answered = true;
                stations.extend(found);
            }
            Err(error) => {
                warn!(
                    feed = %feed.url,
                    system = %feed.system,
                    error = %error,
                    "bysykkel feed skipped"
                );
                last_error = Some(error);
            }
        }
    }
    match last_error {
        Some(error) if !answered => Err(error),
        _ => Ok(stations),
    }
}

#[async_trait]
impl PoiDiscoverySource for BysykkelGbfsSource {
    async fn discover(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<Vec<DiscoveredPoi>, PoiDiscoverySourceError> {
        let per_feed = join_all(self.feeds.iter().map(|feed| self.fetch_feed(feed, query))).await;
        merge_feed_results(self.feeds.iter().zip(per_feed).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::Coordinates;
    use crate::domain::place_type::bike_category;
    use crate::domain::poi::ExternalIdKind;
    use crate::outbound::http_support::decode_json;
    use rstest::rstest;

    const FEED: &str = r#"{
        "last_updated": 1767225600,
        "ttl": 10,
        "data": {
            "stations": [
                {
                    "station_id": "7",
                    "name": "Solsiden",
                    "address": "Beddingen 10",
                    "lat": 63.4341,
                    "lon": 10.4111,
                    "capacity": 24
                },
                {
                    "station_id": "51",
                    "name": "Lerkendal",
                    "lat": 63.4122,
                    "lon": 10.4041,
                    "capacity": 20
                }
            ]
        }
    }"#;

    fn feed(url: &str) -> GbfsFeed {
        GbfsFeed::new(Url::parse(url).expect("valid feed url"))
    }

    fn station(system: &str, station_id: &str) -> DiscoveredPoi {
        DiscoveredPoi::new(
            ExternalIdKind::Bysykkel,
            format!("{system}:{station_id}"),
            "Torvet",
            Coordinates::new(63.4302, 10.3950),
            bike_category(),
        )
    }

    #[rstest]
    fn filters_stations_by_distance() {
        let decoded: StationInformationDto =
            decode_json("bysykkel", FEED.as_bytes()).expect("feed decodes");
        let pois = decoded.into_domain_pois(
            "trondheimbysykkel.no",
            Coordinates::new(63.4305, 10.3951),
            1_000,
        );

        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].id, "bysykkel-trondheimbysykkel.no:7");
        assert_eq!(pois[0].category.id, "bike");
        assert_eq!(pois[0].address.as_deref(), Some("Beddingen 10"));
    }

    #[rstest]
    #[case(
        "https://gbfs.urbansharing.com/oslobysykkel.no/station_information.json",
        "oslobysykkel.no"
    )]
    #[case(
        "https://gbfs.urbansharing.com/trondheimbysykkel.no/station_information.json",
        "trondheimbysykkel.no"
    )]
    #[case("https://gbfs.example/station_information.json", "gbfs.example")]
    fn feeds_are_keyed_by_operator(#[case] url: &str, #[case] system: &str) {
        assert_eq!(feed(url).system, system);
    }

    #[rstest]
    fn same_station_id_in_two_cities_gives_two_identities() {
        let decode = |system: &str| {
            let decoded: StationInformationDto =
                decode_json("bysykkel", FEED.as_bytes()).expect("feed decodes");
            decoded.into_domain_pois(system, Coordinates::new(63.4341, 10.4111), 100)
        };
        let oslo = decode("oslobysykkel.no");
        let trondheim = decode("trondheimbysykkel.no");

        assert_ne!(oslo[0].id, trondheim[0].id);
        assert_eq!(
            trondheim[0].external_ids.get(ExternalIdKind::Bysykkel),
            Some("trondheimbysykkel.no:7")
        );
    }

    #[rstest]
    fn one_failing_feed_keeps_the_others() {
        let oslo = feed("https://gbfs.urbansharing.com/oslobysykkel.no/station_information.json");
        let bergen =
            feed("https://gbfs.urbansharing.com/bergenbysykkel.no/station_information.json");

        let stations = merge_feed_results(vec![
            (&oslo, Err(PoiDiscoverySourceError::timeout("oslo"))),
            (&bergen, Ok(vec![station("bergenbysykkel.no", "12")])),
        ])
        .expect("bergen answered");

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "bysykkel-bergenbysykkel.no:12");
    }

    #[rstest]
    fn every_feed_failing_is_an_error() {
        let oslo = feed("https://gbfs.urbansharing.com/oslobysykkel.no/station_information.json");
        let bergen =
            feed("https://gbfs.urbansharing.com/bergenbysykkel.no/station_information.json");

        let error = merge_feed_results(vec![
            (&oslo, Err(PoiDiscoverySourceError::timeout("oslo"))),
            (&bergen, Err(PoiDiscoverySourceError::rejected("HTTP 503"))),
        ])
        .expect_err("no feed answered");

        assert_eq!(error, PoiDiscoverySourceError::rejected("HTTP 503"));
    }

    #[rstest]
    fn feeds_without_stations_nearby_are_not_failures() {
        let oslo = feed("https://gbfs.urbansharing.com/oslobysykkel.no/station_information.json");
        let stations =
            merge_feed_results(vec![(&oslo, Ok(Vec::new()))]).expect("answered with nothing");
        assert!(stations.is_empty());
    }

    #[tokio::test]
    async fn no_feeds_means_no_stations() {
        let source =
            BysykkelGbfsSource::new(Vec::new(), "placy-test", Duration::from_secs(1))
                .expect("client");
        let query = DiscoveryQuery {
            center: Coordinates::new(59.9139, 10.7522),
            radius_m: 2_000,
            place_types: Vec::new(),
        };
        assert!(source.discover(&query).await.expect("empty").is_empty());
    }
}
