mod common;

use std::path::Path;
use std::sync::Arc;

use common::{write_file, HashingEmbedder, REFUND_POLICY, SHIPPING_POLICY};
use support_rag::error::Error;
use support_rag::ingestion::{IngestPipeline, LoaderRegistry, RecursiveCharacterSplitter};
use support_rag::providers::VectorIndex;
use support_rag::storage::SqliteVectorIndex;
use support_rag::types::IngestOutcome;

fn pipeline(index: &SqliteVectorIndex) -> IngestPipeline {
    IngestPipeline::new(
        LoaderRegistry::with_defaults(),
        RecursiveCharacterSplitter::new(1000, 150),
        Arc::new(HashingEmbedder),
        Arc::new(index.clone()),
        2,
    )
}

#[tokio::test]
async fn test_mixed_folder_is_indexed_recursively() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "refunds.txt", REFUND_POLICY);
    write_file(
        dir.path(),
        "guides/shipping.md",
        &format!("# Shipping\n\n{}", SHIPPING_POLICY),
    );
    write_file(
        dir.path(),
        "faq/FAQ.CSV",
        "question,answer\nHow do I reset my password?,Use the forgot password link\nWhere is my order?,Check the tracking page\n",
    );
    write_file(dir.path(), "logo.png", "not an image");
    write_file(dir.path(), "notes.json", "{}");

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let outcome = pipeline(&index).run(dir.path()).await.unwrap();

    assert_eq!(
        outcome,
        IngestOutcome::Indexed {
            files: 3,
            documents: 4,
            chunks: 4,
        }
    );
    assert_eq!(index.len().unwrap(), 4);
}

#[tokio::test]
async fn test_records_carry_file_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "refunds.txt", REFUND_POLICY);

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    pipeline(&index).run(dir.path()).await.unwrap();

    let hits = index
        .query(&HashingEmbedder::vector(REFUND_POLICY), 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    let metadata = &hits[0].chunk.metadata;
    assert_eq!(metadata.source, "refunds.txt");
    let resolved = std::fs::canonicalize(&path).unwrap();
    assert_eq!(metadata.path, resolved.to_string_lossy());
    assert_eq!(metadata.page, None);
    assert_eq!(hits[0].chunk.text, REFUND_POLICY);
}

#[tokio::test]
async fn test_relative_root_is_stored_as_absolute_paths() {
    let dir = tempfile::Builder::new()
        .prefix("relative-ingest")
        .tempdir_in(".")
        .unwrap();
    let relative = Path::new(".").join(dir.path().file_name().unwrap());
    assert!(relative.is_relative());
    write_file(&relative, "refunds.txt", REFUND_POLICY);

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    pipeline(&index).run(&relative).await.unwrap();

    let hits = index
        .query(&HashingEmbedder::vector(REFUND_POLICY), 1)
        .await
        .unwrap();
    let stored = Path::new(&hits[0].chunk.metadata.path);
    assert!(stored.is_absolute(), "stored path {:?}", stored);
    assert!(stored.ends_with("refunds.txt"));
}

#[tokio::test]
async fn test_reingesting_unchanged_folder_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "refunds.txt", REFUND_POLICY);
    write_file(dir.path(), "shipping.md", SHIPPING_POLICY);
    write_file(
        dir.path(),
        "plans.csv",
        "plan,price\nBasic,10\nPro,25\n",
    );

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let pipeline = pipeline(&index);

    let snapshot = |index: &SqliteVectorIndex| {
        let index = index.clone();
        async move {
            let mut entries: Vec<(String, String, String, Option<u32>)> = index
                .query(&HashingEmbedder::vector("plan price refunds shipping"), 100)
                .await
                .unwrap()
                .into_iter()
                .map(|hit| {
                    let meta = hit.chunk.metadata;
                    (hit.chunk.text, meta.source, meta.path, meta.page)
                })
                .collect();
            entries.sort();
            entries
        }
    };

    let first_outcome = pipeline.run(dir.path()).await.unwrap();
    let first_count = index.len().unwrap();
    let first = snapshot(&index).await;

    let second_outcome = pipeline.run(dir.path()).await.unwrap();
    let second = snapshot(&index).await;

    assert_eq!(first_outcome, second_outcome);
    assert_eq!(first_count, 4);
    assert_eq!(index.len().unwrap(), first_count);
    assert_eq!(first.len(), first_count);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_csv_rows_become_separate_documents() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "plans.csv",
        "plan,price\nBasic,10\nPro,25\nEnterprise,100\n",
    );

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let outcome = pipeline(&index).run(dir.path()).await.unwrap();

    assert_eq!(
        outcome,
        IngestOutcome::Indexed {
            files: 1,
            documents: 3,
            chunks: 3,
        }
    );
    let hits = index
        .query(&HashingEmbedder::vector("plan: Pro\nprice: 25"), 1)
        .await
        .unwrap();
    assert_eq!(hits[0].chunk.text, "plan: Pro\nprice: 25");
}

#[tokio::test]
async fn test_long_document_is_chunked_with_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let paragraph = "Our support team answers every ticket within one business day. ".repeat(8);
    let body = vec![paragraph.trim(); 6].join("\n\n");
    write_file(dir.path(), "support.txt", &body);

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let outcome = pipeline(&index).run(dir.path()).await.unwrap();

    match outcome {
        IngestOutcome::Indexed { documents, chunks, .. } => {
            assert_eq!(documents, 1);
            assert!(chunks > 1);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_folder_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let err = pipeline(&index).run(&missing).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(ref p) if p == &missing));
}

#[tokio::test]
async fn test_folder_without_supported_files_reports_no_documents() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "image.png", "binary");

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let outcome = pipeline(&index).run(dir.path()).await.unwrap();

    assert_eq!(outcome, IngestOutcome::NoDocuments);
    assert!(index.is_empty().unwrap());
}

#[tokio::test]
async fn test_blank_documents_leave_existing_index_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "refunds.txt", REFUND_POLICY);

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let pipeline = pipeline(&index);
    pipeline.run(dir.path()).await.unwrap();
    let before = index.ids().unwrap();

    let blank = tempfile::tempdir().unwrap();
    write_file(blank.path(), "empty.txt", "   \n\n  ");
    let outcome = pipeline.run(blank.path()).await.unwrap();

    assert_eq!(outcome, IngestOutcome::NoDocuments);
    assert_eq!(index.ids().unwrap(), before);
}

#[tokio::test]
async fn test_reingest_replaces_previous_records() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "refunds.txt", REFUND_POLICY);

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let pipeline = pipeline(&index);
    pipeline.run(dir.path()).await.unwrap();
    let first = index.ids().unwrap();

    std::fs::remove_file(dir.path().join("refunds.txt")).unwrap();
    write_file(dir.path(), "shipping.txt", SHIPPING_POLICY);
    pipeline.run(dir.path()).await.unwrap();

    let second = index.ids().unwrap();
    assert_eq!(second.len(), 1);
    assert!(first.iter().all(|id| !second.contains(id)));

    let hits = index
        .query(&HashingEmbedder::vector(REFUND_POLICY), 6)
        .await
        .unwrap();
    assert!(hits.iter().all(|hit| hit.chunk.metadata.source == "shipping.txt"));
}

#[tokio::test]
async fn test_invalid_utf8_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a_good.txt", REFUND_POLICY);
    std::fs::write(dir.path().join("b_bad.txt"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

    let index = SqliteVectorIndex::open_in_memory().unwrap();
    let err = pipeline(&index).run(dir.path()).await.unwrap_err();

    match err {
        Error::Load { path, .. } => assert!(path.ends_with("b_bad.txt")),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(index.is_empty().unwrap());
}
