//! Property-based tests for the retrieval protocol.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Context is returned exactly as the backend produced it
//! - Pass-through completion equals the supplied context
//! - Omitting the context is equivalent to fetching it first

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use graphrecall::storage::StaticGraphProvider;
use graphrecall::{
    BackendKind, Context, CypherSearchRetriever, GraphBackend, QueryLanguage, Retriever,
    SearchType,
};
use proptest::prelude::*;
use serde_json::Value;
use std::sync::Arc;

/// Backend returning a fixed value for every query.
struct ConstantBackend(Value);

#[async_trait]
impl GraphBackend for ConstantBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Neo4j
    }

    fn capabilities(&self) -> &'static [QueryLanguage] {
        &[QueryLanguage::Cypher]
    }

    async fn query(&self, _query: &str) -> graphrecall::Result<Context> {
        Ok(self.0.clone())
    }
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn retriever(value: Value) -> CypherSearchRetriever {
    let backend = Arc::new(ConstantBackend(value));
    CypherSearchRetriever::new(Arc::new(StaticGraphProvider::new(backend)))
}

proptest! {
    /// Property: the context is the backend result, unmodified.
    #[test]
    fn prop_context_is_identity(value in json_value(), query in ".{0,40}") {
        let retriever = retriever(value.clone());
        let context = runtime().block_on(retriever.get_context(&query)).unwrap();
        prop_assert_eq!(context, value);
    }

    /// Property: pass-through completion returns the supplied context.
    #[test]
    fn prop_completion_passes_context_through(
        backend_value in json_value(),
        supplied in json_value(),
    ) {
        let retriever = retriever(backend_value);
        let completion = runtime()
            .block_on(retriever.get_completion("RETURN 1", Some(supplied.clone())))
            .unwrap();
        prop_assert_eq!(completion, supplied);
    }

    /// Property: get_completion(q, None) == get_completion(q, get_context(q)).
    #[test]
    fn prop_completion_without_context_is_equivalent(value in json_value()) {
        let retriever = retriever(value);
        let rt = runtime();
        let implicit = rt.block_on(retriever.get_completion("MATCH (n) RETURN n", None)).unwrap();
        let context = rt.block_on(retriever.get_context("MATCH (n) RETURN n")).unwrap();
        let explicit = rt
            .block_on(retriever.get_completion("MATCH (n) RETURN n", Some(context)))
            .unwrap();
        prop_assert_eq!(implicit, explicit);
    }

    /// Property: SearchType::as_str roundtrips through parse.
    #[test]
    fn prop_search_type_roundtrips(idx in 0usize..5) {
        let search_type = SearchType::all()[idx];
        prop_assert_eq!(SearchType::parse(search_type.as_str()), Some(search_type));
        prop_assert_eq!(
            SearchType::parse(&search_type.as_str().to_uppercase()),
            Some(search_type)
        );
    }
}
