mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

const TOKEN_HEADER: &str = "x-authentication-token";

/// Promote an account to the privileged role directly in the store; role
/// changes are only reflected in tokens issued after the next login.
async fn promote_to_admin(email: &str) -> Result<()> {
    let url = std::env::var("DATABASE_URL")?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await?;
    sqlx::query(
        "UPDATE accounts \
         SET role_id = (SELECT role_id FROM roles WHERE role_name = 'admin') \
         WHERE email = $1",
    )
    .bind(email)
    .execute(&pool)
    .await?;
    Ok(())
}

async fn admin_token(server: &common::TestServer, client: &reqwest::Client) -> Result<String> {
    let email = common::unique_email("admin");

    let res = client
        .post(format!("{}/api/accounts", server.base_url))
        .json(&json!({ "email": email, "password": "admin-pass" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "account create failed");

    promote_to_admin(&email).await?;

    let res = client
        .post(format!("{}/api/accounts/login", server.base_url))
        .json(&json!({ "email": email, "password": "admin-pass" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "admin login failed");

    res.headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("login response missing token header"))
}

fn game_payload(title: &str, category_ids: &[(i64, &str)]) -> serde_json::Value {
    let categories: Vec<serde_json::Value> = category_ids
        .iter()
        .map(|(id, name)| json!({ "categoryid": id, "categoryname": name }))
        .collect();
    json!({
        "title": title,
        "bgdescription": "integration test entry",
        "minplayers": 2,
        "maxplayers": 4,
        "mintime": 30,
        "maxtime": 60,
        "minage": 8,
        "categories": categories
    })
}

#[tokio::test]
async fn search_returns_complete_category_sets() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = admin_token(server, &client).await?;

    // migrations seed Strategy as category 1 and Party as category 2
    let title_a = format!("Tagset A {}", common::unique_email("a"));
    let title_b = format!("Tagset B {}", common::unique_email("b"));

    for (title, cats) in [
        (&title_a, vec![(1, "Strategy"), (2, "Party")]),
        (&title_b, vec![(2, "Party")]),
    ] {
        let res = client
            .post(format!("{}/api/boardgames", server.base_url))
            .header(TOKEN_HEADER, &token)
            .json(&game_payload(title, &cats))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "create failed for {}", title);
    }

    let res = client
        .get(format!("{}/api/boardgames", server.base_url))
        .query(&[("category", "Party")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let games = res.json::<serde_json::Value>().await?;
    let games = games.as_array().expect("array body");

    let find = |title: &str| {
        games
            .iter()
            .find(|g| g["title"] == json!(title))
            .cloned()
            .unwrap_or_else(|| panic!("{} missing from search results", title))
    };

    // both entries match the Party filter, and the filter must not truncate
    // an entry's category list to just the matching category
    let game_a = find(&title_a);
    let names: Vec<&str> = game_a["categories"]
        .as_array()
        .expect("categories array")
        .iter()
        .filter_map(|c| c["categoryname"].as_str())
        .collect();
    assert!(names.contains(&"Strategy"), "full tag set lost: {:?}", names);
    assert!(names.contains(&"Party"));

    let game_b = find(&title_b);
    assert_eq!(game_b["categories"].as_array().map(|a| a.len()), Some(1));

    Ok(())
}

#[tokio::test]
async fn player_filter_respects_entry_range() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = admin_token(server, &client).await?;

    let title = format!("Range {}", common::unique_email("range"));
    let res = client
        .post(format!("{}/api/boardgames", server.base_url))
        .header(TOKEN_HEADER, &token)
        .json(&game_payload(&title, &[(1, "Strategy")]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // the entry spans 2..=4 players
    let contains_at = |players: &'static str| {
        let client = client.clone();
        let base = server.base_url.clone();
        let title = title.clone();
        async move {
            let res = client
                .get(format!("{}/api/boardgames", base))
                .query(&[("players", players)])
                .send()
                .await?;
            assert_eq!(res.status(), StatusCode::OK);
            let games = res.json::<serde_json::Value>().await?;
            Ok::<bool, anyhow::Error>(
                games
                    .as_array()
                    .map(|a| a.iter().any(|g| g["title"] == json!(title.as_str())))
                    .unwrap_or(false),
            )
        }
    };

    assert!(contains_at("3").await?, "players=3 should match 2..=4");
    assert!(!contains_at("5").await?, "players=5 should not match 2..=4");

    Ok(())
}

#[tokio::test]
async fn duplicate_title_conflicts() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = admin_token(server, &client).await?;

    let title = format!("Duplicate {}", common::unique_email("dup"));
    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let res = client
            .post(format!("{}/api/boardgames", server.base_url))
            .header(TOKEN_HEADER, &token)
            .json(&game_payload(&title, &[(1, "Strategy")]))
            .send()
            .await?;
        assert_eq!(res.status(), expected);
    }

    Ok(())
}

#[tokio::test]
async fn update_merges_and_delete_removes() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = admin_token(server, &client).await?;

    let title = format!("Lifecycle {}", common::unique_email("life"));
    let res = client
        .post(format!("{}/api/boardgames", server.base_url))
        .header(TOKEN_HEADER, &token)
        .json(&game_payload(&title, &[(1, "Strategy"), (3, "Family")]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let created = res.json::<serde_json::Value>().await?;
    let id = created["boardgameid"].as_i64().expect("boardgameid");
    assert_eq!(created["categories"].as_array().map(|a| a.len()), Some(2));

    // partial update: only minage changes, categories survive
    let res = client
        .put(format!("{}/api/boardgames/{}", server.base_url, id))
        .header(TOKEN_HEADER, &token)
        .json(&json!({ "minage": 12 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["minage"], json!(12));
    assert_eq!(updated["title"], json!(title.as_str()));
    assert_eq!(updated["categories"].as_array().map(|a| a.len()), Some(2));

    // delete responds with the removed entry, and the id is gone afterwards
    let res = client
        .delete(format!("{}/api/boardgames/{}", server.base_url, id))
        .header(TOKEN_HEADER, &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted = res.json::<serde_json::Value>().await?;
    assert_eq!(deleted["boardgameid"], json!(id));

    let res = client
        .delete(format!("{}/api/boardgames/{}", server.base_url, id))
        .header(TOKEN_HEADER, &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn non_admin_writes_are_forbidden() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let email = common::unique_email("plain");
    client
        .post(format!("{}/api/accounts", server.base_url))
        .json(&json!({ "email": email, "password": "plain-pass" }))
        .send()
        .await?;
    let login = client
        .post(format!("{}/api/accounts/login", server.base_url))
        .json(&json!({ "email": email, "password": "plain-pass" }))
        .send()
        .await?;
    let token = login
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("token header");

    let res = client
        .post(format!("{}/api/boardgames", server.base_url))
        .header(TOKEN_HEADER, &token)
        .json(&game_payload("Never Created", &[(1, "Strategy")]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}
