use std::io::Write;

use content_filter::application::repos::{ContentQuery, ContentRepo, ModuleOptionsRepo};
use content_filter::application::pagination::PageRequest;
use content_filter::infra::error::InfraError;
use content_filter::infra::memory::InMemoryContentStore;

fn seed_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp seed");
    file.write_all(contents.as_bytes()).expect("write seed");
    file
}

#[tokio::test]
async fn bundled_demo_seed_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/content.toml");
    let store = InMemoryContentStore::load(&path).await.expect("demo seed");

    let blog = store
        .find_first_blog_page()
        .await
        .expect("lookup")
        .expect("blog page");
    assert_eq!(blog.id, 2);

    let options = store.module_options("blog").await.expect("options");
    assert_eq!(
        options.get("filtering_the_results").map(String::as_str),
        Some("1")
    );
}

#[tokio::test]
async fn seed_file_round_trips_through_repositories() {
    let file = seed_file(
        r#"
[[pages]]
id = 5
title = "News"
subtype = "dynamic"

[[content]]
id = 1
parent_id = 5
title = "First"

[[content]]
id = 2
parent_id = 5
title = "Second"

[[content]]
id = 3
parent_id = 6
title = "Elsewhere"
"#,
    );

    let store = InMemoryContentStore::load(file.path()).await.expect("seed");
    let page = store
        .paginate(&ContentQuery::scoped_to(5), PageRequest::new(1, 1))
        .await
        .expect("paginate");

    assert_eq!(page.total, 2);
    assert_eq!(page.last_page, 2);
    assert_eq!(page.items[0].title, "First");
}

#[tokio::test]
async fn inconsistent_seed_names_the_file() {
    let file = seed_file(
        r#"
[[custom_fields]]
id = 1
name = "Color"
name_key = "color"

[[custom_fields]]
id = 1
name = "Colour"
name_key = "colour"
"#,
    );

    let err = InMemoryContentStore::load(file.path())
        .await
        .expect_err("duplicate field id");
    match err {
        InfraError::Seed { path, message } => {
            assert_eq!(path, file.path());
            assert!(message.contains("custom field `1`"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
