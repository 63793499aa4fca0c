use crate::{CanonicalIdRule, ENTITY_PREFIX, RegionQuery};
use crate::template::fill;


/// Variable holding the sub-region reached by traversing the containment relation.
pub const PRIMARY_VARIABLE: &str = "item";

/// Variable holding the identifier computed by a [`CanonicalIdRule`].
pub const CANONICAL_VARIABLE: &str = "canonical";

/// Variable under which each region is reported; the regions service keys its output on it.
pub const OUTPUT_VARIABLE: &str = "id";

/// Prefix of the names under which the inner query projects its per-item samples. A variable
/// already in scope may not be bound again, so the samples cannot reuse the original names.
const SAMPLED_PREFIX: &str = "sampled_";


// Without a canonical rule, every deduplicated item is reported as-is.
const UNGROUPED_FORMAT: &str = "#defaultView:MapRegions
SELECT
{PROJECTION}
WHERE {
{INNER}
}
";

// With a canonical rule, items resolving to the same identifier are merged into one row.
const GROUPED_FORMAT: &str = "#defaultView:MapRegions
SELECT
{PROJECTION}
WHERE {
{INNER}
  BIND(COALESCE(?sampled_canonical, ?item) AS ?id)
}
# merge rows sharing a canonical ID
GROUP BY ?id
";

const INNER_FORMAT: &str = "  {
    SELECT
{PROJECTION}
    WHERE {
{PATTERN}
    }
    # remove ID duplicates
    GROUP BY ?item
  }";

const ENTITIES_FORMAT: &str = "      # list of regions whose sub-regions we want
      VALUES ?entity { {ENTITIES} }";

// P150 = "contains administrative territorial entity"
// a statement with a P582 (end time) qualifier no longer holds
const HOP_FORMAT: &str = "      {FROM} p:P150 ?statement{N} .
      ?statement{N} ps:P150 {TO} .
      FILTER NOT EXISTS { ?statement{N} pq:P582 ?end{N} }";

const LABEL_FORMAT: &str = "      OPTIONAL { ?item rdfs:label ?label_{LANG} . FILTER(LANG(?label_{LANG}) = \"{LANG}\") }";
const FIELD_FORMAT: &str = "      OPTIONAL { ?item wdt:{PROPERTY} ?{VARIABLE} }";
const FILTER_FORMAT: &str = "      FILTER({CONDITION})";

const CANONICAL_PROPERTY_FORMAT: &str = "      OPTIONAL { ?item wdt:{PROPERTY} ?canonical }";
const CANONICAL_CLAUSE_FORMAT: &str = "      OPTIONAL { {CLAUSE} }";
const CANONICAL_REWRITE_FORMAT: &str = "      BIND(IF(?item = {FROM}, {TO}, ?item) AS ?canonical)";

const INNER_SAMPLE_FORMAT: &str = "      (SAMPLE(?{VARIABLE}) AS ?sampled_{VARIABLE})";
const OUTER_RENAME_FORMAT: &str = "  (?sampled_{VARIABLE} AS ?{VARIABLE})";
const OUTER_SAMPLE_FORMAT: &str = "  (SAMPLE(?sampled_{VARIABLE}) AS ?{VARIABLE})";


fn entity_iri(entity: &str) -> String {
    format!("{}{}", ENTITY_PREFIX, entity)
}

fn label_variable(language: &str) -> String {
    format!("label_{}", language)
}

fn sampled_variable(variable: &str) -> String {
    format!("{}{}", SAMPLED_PREFIX, variable)
}

/// Renders the traversal from `?entity` to `?item`, composing the containment relation `depth`
/// times.
fn hops(depth: u32) -> Vec<String> {
    let mut hop_clauses = Vec::with_capacity(depth as usize);
    for n in 1..=depth {
        let from = if n == 1 {
            "?entity".to_owned()
        } else {
            format!("?hop{}", n - 1)
        };
        let to = if n == depth {
            format!("?{}", PRIMARY_VARIABLE)
        } else {
            format!("?hop{}", n)
        };
        let n_string = n.to_string();
        hop_clauses.push(fill(HOP_FORMAT, &[
            ("FROM", &from),
            ("TO", &to),
            ("N", &n_string),
        ]));
    }
    hop_clauses
}

fn canonical_clauses(rule: &CanonicalIdRule) -> Vec<String> {
    match rule {
        CanonicalIdRule::Property(property) => vec![
            fill(CANONICAL_PROPERTY_FORMAT, &[("PROPERTY", property)]),
        ],
        CanonicalIdRule::Clauses(clauses) => clauses.iter()
            .map(|clause| fill(CANONICAL_CLAUSE_FORMAT, &[("CLAUSE", clause)]))
            .collect(),
        CanonicalIdRule::Rewrite { from, to } => vec![
            fill(CANONICAL_REWRITE_FORMAT, &[
                ("FROM", &entity_iri(from)),
                ("TO", &entity_iri(to)),
            ]),
        ],
    }
}

/// Renders the SPARQL query selecting the sub-regions described by `query`.
///
/// The result is a pure function of `query`. Nothing is validated: variable names, IDs and the
/// condition are inserted verbatim, and mistakes in them only surface once the endpoint rejects
/// the query.
pub fn build_query(query: &RegionQuery) -> String {
    let entities: Vec<String> = query.root_entities.as_slice().iter()
        .map(|e| entity_iri(e))
        .collect();

    // fields first, then labels
    let mut passed_variables: Vec<String> = query.fields.keys()
        .cloned()
        .collect();
    passed_variables.extend(query.languages.iter().map(|lang| label_variable(lang)));

    // inner query: one row per item
    let mut pattern = vec![fill(ENTITIES_FORMAT, &[("ENTITIES", &entities.join(" "))])];
    pattern.extend(hops(query.depth.get()));
    pattern.extend(query.languages.iter()
        .map(|lang| fill(LABEL_FORMAT, &[("LANG", lang)])));
    pattern.extend(query.fields.iter()
        .map(|(variable, property)| fill(FIELD_FORMAT, &[
            ("PROPERTY", property),
            ("VARIABLE", variable),
        ])));
    if let Some(rule) = &query.canonical_id_rule {
        pattern.extend(canonical_clauses(rule));
    }
    if let Some(condition) = &query.condition {
        pattern.push(fill(FILTER_FORMAT, &[("CONDITION", condition)]));
    }

    let mut inner_projection = vec![format!("      ?{}", PRIMARY_VARIABLE)];
    if query.canonical_id_rule.is_some() {
        inner_projection.push(fill(INNER_SAMPLE_FORMAT, &[("VARIABLE", CANONICAL_VARIABLE)]));
    }
    inner_projection.extend(passed_variables.iter()
        .map(|v| fill(INNER_SAMPLE_FORMAT, &[("VARIABLE", v)])));

    let inner = fill(INNER_FORMAT, &[
        ("PROJECTION", &inner_projection.join("\n")),
        ("PATTERN", &pattern.join("\n")),
    ]);

    // outer query: one row per reported identifier
    let (outer_format, mut outer_projection, passed_format) = match query.canonical_id_rule {
        Some(_) => (
            GROUPED_FORMAT,
            vec![format!("  ?{}", OUTPUT_VARIABLE)],
            OUTER_SAMPLE_FORMAT,
        ),
        None => (
            UNGROUPED_FORMAT,
            vec![format!("  (?{} AS ?{})", PRIMARY_VARIABLE, OUTPUT_VARIABLE)],
            OUTER_RENAME_FORMAT,
        ),
    };
    outer_projection.extend(passed_variables.iter()
        .map(|v| fill(passed_format, &[("VARIABLE", v)])));

    fill(outer_format, &[
        ("PROJECTION", &outer_projection.join("\n")),
        ("INNER", &inner),
    ])
}


#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    fn canada() -> RegionQuery {
        RegionQuery::new("Q16")
            .with_languages(["en", "fr"])
            .with_field("iso_3166_2", "P300")
    }

    /// Checks that the outer query merges rows by their resolved identifier.
    fn assert_grouped_by_canonical(sparql: &str, passed_variables: &[&str]) {
        assert!(sparql.contains("\nSELECT\n  ?id\n"));
        assert!(sparql.contains("\n      (SAMPLE(?canonical) AS ?sampled_canonical)\n"));
        assert!(sparql.contains("\n  BIND(COALESCE(?sampled_canonical, ?item) AS ?id)\n}\n"));
        assert!(sparql.ends_with("\nGROUP BY ?id\n"));
        assert_eq!(2, sparql.matches("GROUP BY").count());
        for variable in passed_variables {
            let outer_sample = format!("\n  (SAMPLE(?sampled_{0}) AS ?{0})\n", variable);
            assert!(sparql.contains(&outer_sample), "missing {:?}", outer_sample);
        }
        assert!(!sparql.contains("\n  (?sampled_"));
    }

    #[test]
    fn test_canada() {
        let sparql = build_query(&canada());
        let expected = "#defaultView:MapRegions
SELECT
  (?item AS ?id)
  (?sampled_iso_3166_2 AS ?iso_3166_2)
  (?sampled_label_en AS ?label_en)
  (?sampled_label_fr AS ?label_fr)
WHERE {
  {
    SELECT
      ?item
      (SAMPLE(?iso_3166_2) AS ?sampled_iso_3166_2)
      (SAMPLE(?label_en) AS ?sampled_label_en)
      (SAMPLE(?label_fr) AS ?sampled_label_fr)
    WHERE {
      # list of regions whose sub-regions we want
      VALUES ?entity { wd:Q16 }
      ?entity p:P150 ?statement1 .
      ?statement1 ps:P150 ?item .
      FILTER NOT EXISTS { ?statement1 pq:P582 ?end1 }
      OPTIONAL { ?item rdfs:label ?label_en . FILTER(LANG(?label_en) = \"en\") }
      OPTIONAL { ?item rdfs:label ?label_fr . FILTER(LANG(?label_fr) = \"fr\") }
      OPTIONAL { ?item wdt:P300 ?iso_3166_2 }
    }
    # remove ID duplicates
    GROUP BY ?item
  }
}
";
        assert_eq!(expected, sparql);
    }

    #[test]
    fn test_canada_coextensive() {
        let query = canada()
            .with_canonical_id_rule(CanonicalIdRule::coextensive());
        let sparql = build_query(&query);
        let expected = "#defaultView:MapRegions
SELECT
  ?id
  (SAMPLE(?sampled_iso_3166_2) AS ?iso_3166_2)
  (SAMPLE(?sampled_label_en) AS ?label_en)
  (SAMPLE(?sampled_label_fr) AS ?label_fr)
WHERE {
  {
    SELECT
      ?item
      (SAMPLE(?canonical) AS ?sampled_canonical)
      (SAMPLE(?iso_3166_2) AS ?sampled_iso_3166_2)
      (SAMPLE(?label_en) AS ?sampled_label_en)
      (SAMPLE(?label_fr) AS ?sampled_label_fr)
    WHERE {
      # list of regions whose sub-regions we want
      VALUES ?entity { wd:Q16 }
      ?entity p:P150 ?statement1 .
      ?statement1 ps:P150 ?item .
      FILTER NOT EXISTS { ?statement1 pq:P582 ?end1 }
      OPTIONAL { ?item rdfs:label ?label_en . FILTER(LANG(?label_en) = \"en\") }
      OPTIONAL { ?item rdfs:label ?label_fr . FILTER(LANG(?label_fr) = \"fr\") }
      OPTIONAL { ?item wdt:P300 ?iso_3166_2 }
      OPTIONAL { ?item wdt:P3403 ?canonical }
    }
    # remove ID duplicates
    GROUP BY ?item
  }
  BIND(COALESCE(?sampled_canonical, ?item) AS ?id)
}
# merge rows sharing a canonical ID
GROUP BY ?id
";
        assert_eq!(expected, sparql);
    }

    #[test]
    fn test_no_blank_lines() {
        let minimal = build_query(&RegionQuery::new("Q183"));
        assert!(!minimal.contains("\n\n"), "blank line in {:?}", minimal);
        assert!(minimal.contains("\nSELECT\n  (?item AS ?id)\nWHERE {\n"));

        let full = build_query(
            &canada()
                .with_depth(NonZeroU32::new(2).unwrap())
                .with_condition("BOUND(?iso_3166_2)")
                .with_canonical_id_rule(CanonicalIdRule::Clauses(Vec::new()))
        );
        assert!(!full.contains("\n\n"), "blank line in {:?}", full);
    }

    #[test]
    fn test_depth_composes_relation() {
        for depth in 1..=4 {
            let query = canada()
                .with_depth(NonZeroU32::new(depth).unwrap());
            let sparql = build_query(&query);
            assert_eq!(depth as usize, sparql.matches(" p:P150 ").count());
            assert_eq!(depth as usize, sparql.matches(" ps:P150 ").count());
            assert_eq!(depth as usize, sparql.matches(" pq:P582 ").count());
        }
    }

    #[test]
    fn test_depth_chain() {
        let query = RegionQuery::new("Q142")
            .with_depth(NonZeroU32::new(3).unwrap());
        let sparql = build_query(&query);
        assert!(sparql.contains("?entity p:P150 ?statement1 ."));
        assert!(sparql.contains("?statement1 ps:P150 ?hop1 ."));
        assert!(sparql.contains("?hop1 p:P150 ?statement2 ."));
        assert!(sparql.contains("?statement2 ps:P150 ?hop2 ."));
        assert!(sparql.contains("?hop2 p:P150 ?statement3 ."));
        assert!(sparql.contains("?statement3 ps:P150 ?item ."));
        assert!(!sparql.contains("?hop3"));
    }

    #[test]
    fn test_one_label_per_language() {
        let query = RegionQuery::new("Q183")
            .with_languages(["en", "de", "fr"]);
        let sparql = build_query(&query);
        for lang in ["en", "de", "fr"] {
            let clause = format!("OPTIONAL {{ ?item rdfs:label ?label_{0} . FILTER(LANG(?label_{0}) = \"{0}\") }}", lang);
            assert_eq!(1, sparql.matches(&clause).count());
            assert_eq!(1, sparql.matches(&format!("\n  (?sampled_label_{0} AS ?label_{0})\n", lang)).count());
            assert_eq!(1, sparql.matches(&format!("(SAMPLE(?label_{0}) AS ?sampled_label_{0})", lang)).count());
        }
        assert_eq!(3, sparql.matches("rdfs:label").count());
    }

    #[test]
    fn test_no_languages() {
        let sparql = build_query(&RegionQuery::new("Q183"));
        assert!(!sparql.contains("rdfs:label"));
        assert!(!sparql.contains("?label_"));
    }

    #[test]
    fn test_one_clause_per_field() {
        let query = RegionQuery::new("Q183")
            .with_field("iso_3166_2", "P300")
            .with_field("osm_relation", "P402");
        let sparql = build_query(&query);
        assert_eq!(1, sparql.matches("OPTIONAL { ?item wdt:P300 ?iso_3166_2 }").count());
        assert_eq!(1, sparql.matches("OPTIONAL { ?item wdt:P402 ?osm_relation }").count());
        assert_eq!(1, sparql.matches("\n  (?sampled_iso_3166_2 AS ?iso_3166_2)\n").count());
        assert_eq!(1, sparql.matches("\n  (?sampled_osm_relation AS ?osm_relation)\n").count());
        assert_eq!(2, sparql.matches("wdt:").count());

        // catalog order is kept
        let iso_index = sparql.find("AS ?iso_3166_2)").unwrap();
        let osm_index = sparql.find("AS ?osm_relation)").unwrap();
        assert!(iso_index < osm_index);
    }

    #[test]
    fn test_idempotent() {
        let query = canada()
            .with_condition("BOUND(?iso_3166_2)")
            .with_canonical_id_rule(CanonicalIdRule::coextensive());
        assert_eq!(build_query(&query), build_query(&query));
    }

    #[test]
    fn test_single_entity_equals_one_element_list() {
        let single = RegionQuery::new("Q16");
        let list = RegionQuery::new(vec!["Q16".to_owned()]);
        assert_eq!(build_query(&single), build_query(&list));
    }

    #[test]
    fn test_multiple_entities() {
        let query = RegionQuery::new(&["Q16", "Q30"][..]);
        let sparql = build_query(&query);
        assert!(sparql.contains("VALUES ?entity { wd:Q16 wd:Q30 }"));
    }

    #[test]
    fn test_primary_id_without_rule() {
        let sparql = build_query(&canada());
        assert!(sparql.contains("\n  (?item AS ?id)\n"));
        assert!(!sparql.contains("canonical"));
        assert!(!sparql.contains("COALESCE"));
        assert_eq!(1, sparql.matches("GROUP BY").count());
        assert!(!sparql.contains("GROUP BY ?id"));
    }

    #[test]
    fn test_coextensive_rule() {
        let query = canada()
            .with_canonical_id_rule(CanonicalIdRule::coextensive());
        let sparql = build_query(&query);
        assert_grouped_by_canonical(&sparql, &["iso_3166_2", "label_en", "label_fr"]);
        assert_eq!(1, sparql.matches("OPTIONAL { ?item wdt:P3403 ?canonical }").count());

        // the canonical variable is consumed by the outer query, not reported
        assert!(!sparql.contains("AS ?canonical)"));
    }

    #[test]
    fn test_collapse_without_passed_variables() {
        let query = RegionQuery::new("Q30")
            .with_canonical_id_rule(CanonicalIdRule::coextensive());
        let sparql = build_query(&query);
        assert_grouped_by_canonical(&sparql, &[]);
        assert!(sparql.starts_with("#defaultView:MapRegions\nSELECT\n  ?id\nWHERE {\n"));
    }

    #[test]
    fn test_clauses_rule() {
        let rule = CanonicalIdRule::Clauses(vec![
            "?item wdt:P3403 ?canonical".to_owned(),
            "?item wdt:P1336 ?canonical".to_owned(),
        ]);
        let sparql = build_query(&canada().with_canonical_id_rule(rule));
        assert!(sparql.contains("\n      OPTIONAL { ?item wdt:P3403 ?canonical }\n      OPTIONAL { ?item wdt:P1336 ?canonical }\n"));
        assert_grouped_by_canonical(&sparql, &["iso_3166_2", "label_en", "label_fr"]);
    }

    #[test]
    fn test_empty_clauses_rule() {
        let sparql = build_query(&canada().with_canonical_id_rule(CanonicalIdRule::Clauses(Vec::new())));
        // nothing binds ?canonical, so every row falls back to ?item
        assert_grouped_by_canonical(&sparql, &["iso_3166_2", "label_en", "label_fr"]);
        assert!(!sparql.contains("OPTIONAL { ?item wdt:P3403"));
    }

    #[test]
    fn test_rewrite_rule() {
        let rule = CanonicalIdRule::Rewrite { from: "Q1".to_owned(), to: "Q2".to_owned() };
        let sparql = build_query(&canada().with_canonical_id_rule(rule));
        assert!(sparql.contains("BIND(IF(?item = wd:Q1, wd:Q2, ?item) AS ?canonical)"));
        assert_grouped_by_canonical(&sparql, &["iso_3166_2", "label_en", "label_fr"]);
    }

    #[test]
    fn test_condition_after_bindings() {
        let sparql = build_query(
            &canada()
                .with_canonical_id_rule(CanonicalIdRule::coextensive())
                .with_condition("BOUND(?iso_3166_2)")
        );
        let filter_index = sparql.find("\n      FILTER(BOUND(?iso_3166_2))\n    }\n").unwrap();
        let last_optional = sparql.rfind("OPTIONAL").unwrap();
        let group_index = sparql.find("GROUP BY ?item").unwrap();
        assert!(last_optional < filter_index);
        assert!(filter_index < group_index);
    }

    #[test]
    fn test_no_condition_no_filter() {
        let sparql = build_query(&canada());
        // only the per-language label filters remain
        assert_eq!(2, sparql.matches("FILTER(").count());
    }

    #[test]
    fn test_condition_placeholder_kept() {
        let sparql = build_query(&canada().with_condition("STR(?label_en) != \"{PATTERN}\""));
        assert!(sparql.contains("FILTER(STR(?label_en) != \"{PATTERN}\")"));
        assert_eq!(1, sparql.matches(" ps:P150 ").count());
    }
}
