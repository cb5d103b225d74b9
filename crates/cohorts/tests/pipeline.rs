//! End-to-end pipeline behavior over raw CSV input.

use cohorts::cluster::ClusteringError;
use cohorts::data::SchemaError;
use cohorts::pipeline::{CellValue, ClusterPipeline, PipelineConfig, PipelineError, Verbosity};
use rstest::rstest;

const PEOPLE_CSV: &[u8] = b"name,age,gaming_platform_top1\n\
                            Alice,20,PC\n\
                            Bob,45,Console\n\
                            Carol,22,PC\n\
                            Dan,50,Console\n";

fn pipeline(n_clusters: usize) -> ClusterPipeline {
    ClusterPipeline::new(PipelineConfig {
        n_clusters,
        verbosity: Verbosity::Silent,
        ..Default::default()
    })
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
fn every_row_lands_in_exactly_one_cluster(#[case] k: usize) {
    let result = pipeline(k).run_csv(PEOPLE_CSV).unwrap();

    let assigned: usize = result.clusters().iter().map(|c| c.len()).sum();
    assert_eq!(assigned, 4);
    assert_eq!(result.n_rows(), 4);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn all_k_labels_are_present(#[case] k: usize) {
    let result = pipeline(k).run_csv(PEOPLE_CSV).unwrap();
    assert_eq!(result.clusters().len(), k);
    assert_eq!(result.cluster_count(), k);
}

#[test]
fn empty_clusters_are_kept_in_the_summary() {
    // Three identical rows: only one distinct feature point exists, so for
    // k = 3 the surplus labels own no rows. They must still be emitted.
    let csv = b"name,age\nAlice,30\nBob,30\nCarol,30\n";
    let result = pipeline(3).run_csv(csv).unwrap();

    assert_eq!(result.clusters().len(), 3);
    let assigned: usize = result.clusters().iter().map(|c| c.len()).sum();
    assert_eq!(assigned, 3);
    assert!(result.n_empty_clusters() >= 1);

    let json: serde_json::Value =
        serde_json::from_str(&result.to_download_json().unwrap()).unwrap();
    let clusters = json["clusters"].as_object().unwrap();
    assert_eq!(clusters.len(), 3);
    assert!(clusters.contains_key("Cluster 2"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let a = pipeline(3).run_csv(PEOPLE_CSV).unwrap();
    let b = pipeline(3).run_csv(PEOPLE_CSV).unwrap();

    assert_eq!(a, b);
    assert_eq!(
        a.to_download_json().unwrap(),
        b.to_download_json().unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn missing_name_column_is_a_schema_error() {
    let csv = b"age,gaming_platform_top1\n20,PC\n45,Console\n";
    let result = pipeline(2).run_csv(csv);

    assert!(matches!(
        result,
        Err(PipelineError::Schema(SchemaError::MissingIdentifier(_)))
    ));
}

#[test]
fn no_numeric_columns_is_a_schema_error() {
    let csv = b"name,ott_top1,bio\nAlice,Netflix,reads\nBob,Hulu,writes\n";
    let result = pipeline(2).run_csv(csv);

    assert!(matches!(
        result,
        Err(PipelineError::Schema(SchemaError::NoNumericColumns))
    ));
}

#[test]
fn k_greater_than_row_count_is_a_clustering_error() {
    let result = pipeline(5).run_csv(b"name,age\nAlice,20\nBob,45\n");

    assert!(matches!(
        result,
        Err(PipelineError::Clustering(ClusteringError::TooManyClusters {
            k: 5,
            rows: 2
        }))
    ));
}

#[test]
fn age_groups_split_into_separate_clusters() {
    // Age dominates scaled distance; the platform column is a secondary
    // encoded feature. Which index each group gets may vary, but the two
    // real-world groupings must not be split across the same cluster.
    let result = pipeline(2).run_csv(PEOPLE_CSV).unwrap();

    let cluster_of = |name: &str| {
        result
            .clusters()
            .iter()
            .position(|members| members.iter().any(|m| m == name))
            .unwrap()
    };

    assert_eq!(cluster_of("Alice"), cluster_of("Carol"));
    assert_eq!(cluster_of("Bob"), cluster_of("Dan"));
    assert_ne!(cluster_of("Alice"), cluster_of("Bob"));
}

#[test]
fn constant_numeric_column_standardizes_to_zero() {
    let csv = b"name,age,height\nAlice,20,170\nBob,45,170\nCarol,22,170\n";
    let result = pipeline(2).run_csv(csv).unwrap();

    for row in result.all_rows() {
        match row.get("height") {
            Some(CellValue::Float(v)) => {
                assert_eq!(*v, 0.0);
                assert!(v.is_finite());
            }
            other => panic!("expected scaled height, got {other:?}"),
        }
    }
}

#[test]
fn download_export_carries_only_summary_keys() {
    let result = pipeline(2).run_csv(PEOPLE_CSV).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&result.to_download_json().unwrap()).unwrap();

    let object = json.as_object().unwrap();
    let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["clusters", "number_of_clusters"]);
    assert_eq!(json["number_of_clusters"], 2);
}

#[test]
fn full_payload_carries_all_rows_with_transformed_values() {
    let result = pipeline(2).run_csv(PEOPLE_CSV).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();

    let rows = json["all_rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);

    let first = rows[0].as_object().unwrap();
    assert_eq!(first["name"], "Alice");
    // Platform and age are both transformed (encoded-then-scaled and
    // scaled) floats; the cluster label is attached to every record.
    assert!(first["gaming_platform_top1"].is_f64());
    assert!(first["age"].is_f64());
    assert!(first["Cluster"].is_i64());
}

#[test]
fn row_order_is_preserved_within_clusters() {
    // Carol appears before Alice in the input; the summary must keep that
    // order inside their shared cluster.
    let csv = b"name,age\nCarol,21\nBob,45\nAlice,20\nDan,50\n";
    let result = pipeline(2).run_csv(csv).unwrap();

    let young: &[String] = result
        .clusters()
        .iter()
        .find(|members| members.iter().any(|m| m == "Carol"))
        .unwrap();
    assert_eq!(young, &["Carol".to_string(), "Alice".to_string()]);
}

#[test]
fn ignored_columns_survive_into_the_row_export() {
    let csv = b"name,age,bio\nAlice,20,likes cats\nBob,45,likes dogs\n";
    let result = pipeline(2).run_csv(csv).unwrap();

    assert_eq!(
        result.all_rows()[0].get("bio"),
        Some(&CellValue::Text("likes cats".to_string()))
    );
}

#[test]
fn seed_override_changes_nothing_about_the_contract() {
    // A different seed may relabel clusters but still partitions totally.
    let mut config = PipelineConfig {
        n_clusters: 2,
        verbosity: Verbosity::Silent,
        ..Default::default()
    };
    config.kmeans.seed = 7;

    let result = ClusterPipeline::new(config).run_csv(PEOPLE_CSV).unwrap();
    let assigned: usize = result.clusters().iter().map(|c| c.len()).sum();
    assert_eq!(assigned, 4);
}
