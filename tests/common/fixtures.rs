//! Static fixtures: the blog article corpus, its schema, and the normalized
//! graph it must produce.

use normchain::{array_of, Catalog, EntitySchema, Schema};
use serde_json::{json, Value};

/// Raw response with two articles and their authors.
pub fn article_response() -> Value {
    json!({
        "articles": [
            {
                "id": 1,
                "title": "Some Article",
                "author": {"id": 7, "name": "Dan"}
            },
            {
                "id": 2,
                "title": "Another Article",
                "author": {"id": 9, "name": "Will"}
            }
        ]
    })
}

/// `article_response()` after normalization with `article_schema()`.
pub fn expected_article_graph() -> Value {
    json!({
        "result": {"articles": [1, 2]},
        "entities": {
            "articles": {
                "1": {"id": 1, "title": "Some Article", "author": 7},
                "2": {"id": 2, "title": "Another Article", "author": 9}
            },
            "users": {
                "7": {"id": 7, "name": "Dan"},
                "9": {"id": 9, "name": "Will"}
            }
        }
    })
}

/// `{articles: [article]}` where an article has a user `author` and a list
/// of `collections`, each with a user `curator`.
pub fn article_schema() -> Schema {
    let article = EntitySchema::new("articles");
    let user = EntitySchema::new("users");
    let collection = EntitySchema::new("collections");

    article
        .define([
            ("author", Schema::from(&user)),
            ("collections", array_of(&collection)),
        ])
        .expect("fresh entity");
    collection
        .define([("curator", Schema::from(&user))])
        .expect("fresh entity");

    Schema::object([("articles", array_of(&article))])
}

/// The same entities as `article_schema()`, declared as a catalog document.
pub const ARTICLE_CATALOG: &str = r#"{
  "entities": {
    "articles":    { "fields": { "author": "users", "collections": ["collections"] } },
    "collections": { "fields": { "curator": "users" } },
    "users":       {}
  }
}"#;

pub fn article_catalog() -> Catalog {
    Catalog::from_json(ARTICLE_CATALOG).expect("fixture catalog is valid")
}
