//! Property tests for the in-memory vector index.

use ragchat_rag::document::{Chunk, Metadata};
use ragchat_rag::inmemory::InMemoryVectorIndex;
use ragchat_rag::vectorstore::VectorIndex;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-3 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn chunk(text: String) -> Chunk {
    Chunk {
        id: String::new(),
        document_id: "doc_1".to_string(),
        end: text.len(),
        text,
        start: 0,
        metadata: Metadata::default(),
    }
}

mod prop_inmemory_query {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Hits come back by ascending distance, within `[0, 2]`, and at most `top_k`.
        #[test]
        fn hits_ordered_ascending_and_bounded_by_top_k(
            entries in proptest::collection::vec(
                ("[a-z ]{5,30}", arb_normalized_embedding(DIM)),
                1..20,
            ),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let stored = entries.len();
            let hits = rt.block_on(async {
                let index = InMemoryVectorIndex::new("test", DIM);
                let (texts, embeddings): (Vec<String>, Vec<Vec<f32>>) = entries.into_iter().unzip();
                index.add(texts.into_iter().map(chunk).collect(), embeddings).await.unwrap();
                index.query(&query, top_k).await.unwrap()
            });

            prop_assert!(hits.len() <= top_k);
            prop_assert_eq!(hits.len(), top_k.min(stored));
            for hit in &hits {
                prop_assert!((-1e-4..=2.0 + 1e-4).contains(&hit.distance));
            }
            for window in hits.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "hits not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
        }

        /// Adding one vector grows the count by one and it matches itself exactly.
        #[test]
        fn added_vector_is_its_own_nearest_neighbour(
            existing in proptest::collection::vec(arb_normalized_embedding(DIM), 0..10),
            embedding in arb_normalized_embedding(DIM),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (before, after, hits) = rt.block_on(async {
                let index = InMemoryVectorIndex::new("test", DIM);
                if !existing.is_empty() {
                    let chunks = (0..existing.len()).map(|i| chunk(format!("existing {i}"))).collect();
                    index.add(chunks, existing.clone()).await.unwrap();
                }
                let before = index.count().await.unwrap();
                let ids = index.add(vec![chunk("target".to_string())], vec![embedding.clone()]).await.unwrap();
                let after = index.count().await.unwrap();
                let hits = index.query(&embedding, before + 1).await.unwrap();
                (before, after, (ids, hits))
            });

            prop_assert_eq!(after, before + 1);
            let (ids, hits) = hits;
            let own = hits.iter().find(|h| h.id == ids[0]).unwrap();
            prop_assert!(own.distance.abs() < 1e-4);
            prop_assert!(hits[0].distance.abs() < 1e-4);
        }
    }
}
