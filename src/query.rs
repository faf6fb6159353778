//! Shipment listing inputs and their translation into a store-agnostic query.
//!
//! Every store implementation consumes the same [`ShipmentQuery`], [`Sort`] and
//! [`Page`] values: Postgres renders them to SQL, the in-memory store evaluates
//! them through [`ShipmentQuery::matcher`] and [`Sort::compare`].

use std::cmp::Ordering;

use juniper::{GraphQLEnum, GraphQLInputObject};
use regex::{Regex, RegexBuilder};
use rust_stemmers::{Algorithm, Stemmer};

use crate::db::StoreError;
use crate::models::{Shipment, ShipmentStatus};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct ShipmentFilter {
    /// Free-text search over names, locations, tracking number and reference.
    pub q: Option<String>,
    pub status: Option<ShipmentStatus>,
    pub shipper_name: Option<String>,
    pub carrier_name: Option<String>,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
}

#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct PaginationInput {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct ShipmentSort {
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, GraphQLEnum)]
pub enum SortOrder {
    #[graphql(name = "asc")]
    Asc,
    #[default]
    #[graphql(name = "desc")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Limit is clamped to `1..=100` (default 10), offset to `>= 0` (default 0).
    pub fn clamp(limit: Option<i32>, offset: Option<i32>) -> Self {
        Self {
            limit: limit
                .map_or(DEFAULT_LIMIT, i64::from)
                .clamp(1, MAX_LIMIT),
            offset: offset.map_or(0, i64::from).max(0),
        }
    }

    pub fn from_input(input: Option<&PaginationInput>) -> Self {
        match input {
            Some(p) => Self::clamp(p.limit, p.offset),
            None => Self::clamp(None, None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    DeliveryDate,
    PickupDate,
    RateUsd,
    Status,
    ShipperName,
    CarrierName,
    CreatedAt,
}

impl SortField {
    /// Looks up an allow-listed field by its API name. Anything unknown sorts
    /// by delivery date, so caller input never reaches the ORDER BY clause.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("pickupDate") => SortField::PickupDate,
            Some("rateUsd") => SortField::RateUsd,
            Some("status") => SortField::Status,
            Some("shipperName") => SortField::ShipperName,
            Some("carrierName") => SortField::CarrierName,
            Some("createdAt") => SortField::CreatedAt,
            _ => SortField::DeliveryDate,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::DeliveryDate => "delivery_date",
            SortField::PickupDate => "pickup_date",
            SortField::RateUsd => "rate_usd",
            SortField::Status => "status",
            SortField::ShipperName => "shipper_name",
            SortField::CarrierName => "carrier_name",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn from_input(input: Option<&ShipmentSort>) -> Self {
        Self {
            field: SortField::from_name(input.and_then(|s| s.sort_by.as_deref())),
            order: input.and_then(|s| s.order).unwrap_or_default(),
        }
    }

    /// Orders by the sort field in the requested direction, then by id
    /// ascending. Mirrors the ORDER BY the Postgres store emits.
    pub fn compare(&self, a: &Shipment, b: &Shipment) -> Ordering {
        let primary = match self.field {
            SortField::DeliveryDate => a.delivery_date.cmp(&b.delivery_date),
            SortField::PickupDate => a.pickup_date.cmp(&b.pickup_date),
            SortField::RateUsd => a.rate_usd.total_cmp(&b.rate_usd),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::ShipperName => a.shipper_name.cmp(&b.shipper_name),
            SortField::CarrierName => a.carrier_name.cmp(&b.carrier_name),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    ShipperName,
    CarrierName,
    PickupLocation,
    DeliveryLocation,
}

impl MatchField {
    pub fn column(self) -> &'static str {
        match self {
            MatchField::ShipperName => "shipper_name",
            MatchField::CarrierName => "carrier_name",
            MatchField::PickupLocation => "pickup_location",
            MatchField::DeliveryLocation => "delivery_location",
        }
    }

    fn api_name(self) -> &'static str {
        match self {
            MatchField::ShipperName => "shipperName",
            MatchField::CarrierName => "carrierName",
            MatchField::PickupLocation => "pickupLocation",
            MatchField::DeliveryLocation => "deliveryLocation",
        }
    }

    fn value(self, shipment: &Shipment) -> &str {
        match self {
            MatchField::ShipperName => &shipment.shipper_name,
            MatchField::CarrierName => &shipment.carrier_name,
            MatchField::PickupLocation => &shipment.pickup_location,
            MatchField::DeliveryLocation => &shipment.delivery_location,
        }
    }
}

/// Case-insensitive, unanchored pattern against one column. The caller's
/// pattern is handed to the store untouched, so regex metacharacters keep
/// their meaning and the store's regex engine decides what is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPattern {
    pub field: MatchField,
    pub pattern: String,
}

impl FieldPattern {
    /// In-process counterpart of Postgres `~*`.
    pub fn compile(&self) -> Result<Regex, StoreError> {
        RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| StoreError::InvalidPattern(format!("{}: {e}", self.field.api_name())))
    }
}

/// Conjunction of the conditions present in a [`ShipmentFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentQuery {
    pub status: Option<ShipmentStatus>,
    pub patterns: Vec<FieldPattern>,
    /// Lowercased search terms without stop words; any one of them matching
    /// is enough.
    pub terms: Vec<String>,
}

impl ShipmentQuery {
    pub fn build(filter: Option<&ShipmentFilter>) -> Self {
        let Some(filter) = filter else {
            return Self::default();
        };

        let patterns = [
            (MatchField::ShipperName, &filter.shipper_name),
            (MatchField::CarrierName, &filter.carrier_name),
            (MatchField::PickupLocation, &filter.pickup_location),
            (MatchField::DeliveryLocation, &filter.delivery_location),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|pattern| FieldPattern {
                    field,
                    pattern: pattern.to_string(),
                })
        })
        .collect();

        let terms = filter.q.as_deref().map(search_terms).unwrap_or_default();

        Self {
            status: filter.status,
            patterns,
            terms,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.status.is_none() && self.patterns.is_empty() && self.terms.is_empty()
    }

    /// `to_tsquery` input OR-ing all search terms, or `None` without a search.
    pub fn tsquery(&self) -> Option<String> {
        if self.terms.is_empty() {
            None
        } else {
            Some(self.terms.join(" | "))
        }
    }

    /// Prepares the query for evaluation in process. Fails when a pattern
    /// does not compile.
    pub fn matcher(&self) -> Result<ShipmentMatcher<'_>, StoreError> {
        let regexes = self
            .patterns
            .iter()
            .map(|p| Ok((p.field, p.compile()?)))
            .collect::<Result<Vec<_>, StoreError>>()?;

        let stemmer = Stemmer::create(Algorithm::English);
        let stems = self.terms.iter().map(|t| stemmer.stem(t).into_owned()).collect();

        Ok(ShipmentMatcher {
            query: self,
            regexes,
            stemmer,
            stems,
        })
    }
}

/// A [`ShipmentQuery`] with compiled patterns and stemmed search terms.
///
/// Text search follows the `english` configuration behind the
/// `search_vector` column: alphanumeric words, lowercased, stop words
/// dropped, Snowball English stems compared.
pub struct ShipmentMatcher<'a> {
    query: &'a ShipmentQuery,
    regexes: Vec<(MatchField, Regex)>,
    stemmer: Stemmer,
    stems: Vec<String>,
}

impl ShipmentMatcher<'_> {
    pub fn matches(&self, shipment: &Shipment) -> bool {
        if self.query.status.is_some_and(|status| status != shipment.status) {
            return false;
        }
        if !self
            .regexes
            .iter()
            .all(|(field, regex)| regex.is_match(field.value(shipment)))
        {
            return false;
        }
        self.stems.is_empty() || self.matches_text(shipment)
    }

    fn matches_text(&self, shipment: &Shipment) -> bool {
        [
            &shipment.shipper_name,
            &shipment.carrier_name,
            &shipment.pickup_location,
            &shipment.delivery_location,
            &shipment.tracking_number,
            &shipment.reference,
        ]
        .into_iter()
        .flat_map(|text| search_terms(text))
        .any(|word| {
            let stem = self.stemmer.stem(&word);
            self.stems.iter().any(|s| *s == stem)
        })
    }
}

/// Postgres `english` stop word list. These never make it into a tsvector
/// or a tsquery.
const STOP_WORDS: [&str; 127] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now",
];

/// Splits on anything that is not alphanumeric, lowercases and drops stop
/// words. The split is also what keeps terms safe to splice into a tsquery.
fn search_terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}
