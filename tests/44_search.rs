mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

// The database persists across runs, so every test seeds listings under a
// unique location marker and filters on it.

fn marker(tag: &str) -> String {
    format!("{}-{}", tag, std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos())
}

async fn seed(server: &common::TestServer, token: &str, location: &str) -> Result<()> {
    let listings = [
        json!({
            "title": "Budget flat",
            "description": "D",
            "price": 100000,
            "location": format!("Sunrise Colony {}", location),
            "area": 600,
            "areaUnit": "sqft",
            "facing": "North"
        }),
        json!({
            "title": "Mid-range house",
            "description": "D",
            "price": 500000,
            "location": format!("sunrise colony {}", location),
            "area": 1500,
            "areaUnit": "sqft",
            "facing": "South-East"
        }),
        json!({
            "title": "Luxury villa",
            "description": "D",
            "price": 2000000,
            "location": format!("Lakeview {}", location),
            "area": 4000,
            "areaUnit": "sqft",
            "facing": "North"
        }),
    ];
    for listing in listings {
        common::create_listing(server, token, listing).await?;
    }
    Ok(())
}

async fn search(server: &common::TestServer, query: &str) -> Result<Vec<Value>> {
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/properties/search?{}", server.base_url, query))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "query: {}", query);
    Ok(res.json::<Vec<Value>>().await?)
}

#[tokio::test]
async fn price_filter_is_an_upper_bound() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;
    let m = marker("price");
    seed(server, &token, &m).await?;

    let results = search(server, &format!("location={}&price=500000", m)).await?;
    assert_eq!(results.len(), 2, "results: {:?}", results);
    for listing in &results {
        assert!(listing["price"].as_f64().unwrap() <= 500_000.0);
    }
    Ok(())
}

#[tokio::test]
async fn location_match_is_case_insensitive_substring() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;
    let m = marker("loc");
    seed(server, &token, &m).await?;

    // "SUNRISE" matches both the capitalized and lowercased seeds
    let results = search(server, &format!("location=SUNRISE%20colony%20{}", m)).await?;
    assert_eq!(results.len(), 2, "results: {:?}", results);
    for listing in &results {
        let loc = listing["location"].as_str().unwrap().to_lowercase();
        assert!(loc.contains("sunrise colony"));
    }
    Ok(())
}

#[tokio::test]
async fn facing_and_area_filters_combine_with_and() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;
    let m = marker("combo");
    seed(server, &token, &m).await?;

    // facing=North alone matches the budget flat and the villa; adding the
    // area bound leaves only the flat
    let results = search(server, &format!("location={}&facing=North", m)).await?;
    assert_eq!(results.len(), 2, "results: {:?}", results);

    let results = search(server, &format!("location={}&facing=North&area=1000", m)).await?;
    assert_eq!(results.len(), 1, "results: {:?}", results);
    assert_eq!(results[0]["title"], "Budget flat");
    Ok(())
}

#[tokio::test]
async fn unparseable_criteria_are_ignored_not_errors() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;
    let m = marker("junk");
    seed(server, &token, &m).await?;

    // Junk price and unknown facing impose no constraint at all
    let results = search(server, &format!("location={}&price=expensive&facing=Sideways", m)).await?;
    assert_eq!(results.len(), 3, "results: {:?}", results);
    Ok(())
}

#[tokio::test]
async fn location_wildcard_characters_match_literally() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;
    let m = marker("literal");

    // One location contains a literal "100%", the other would only match if
    // "%" acted as a wildcard inside the needle
    for location in [format!("Block 100% {}", m), format!("Block 100x {}", m)] {
        common::create_listing(
            server,
            &token,
            json!({
                "title": "Plot",
                "description": "D",
                "price": 100,
                "location": location,
                "facing": "West"
            }),
        )
        .await?;
    }

    let results = search(server, &format!("location=100%25%20{}", m)).await?;
    assert_eq!(results.len(), 1, "results: {:?}", results);
    assert!(results[0]["location"].as_str().unwrap().contains("100%"));
    Ok(())
}

#[tokio::test]
async fn no_criteria_returns_everything_newest_first() -> Result<()> {
    if !common::database_configured() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;
    let m = marker("order");
    seed(server, &token, &m).await?;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/properties", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let all = res.json::<Vec<Value>>().await?;

    // The unfiltered list contains at least our three seeds
    let ours: Vec<&Value> = all
        .iter()
        .filter(|l| l["location"].as_str().unwrap_or("").contains(&m))
        .collect();
    assert_eq!(ours.len(), 3);

    // Newest first across the whole list; RFC3339 strings sort
    // lexicographically in chronological order
    let mut prev: Option<String> = None;
    for listing in all.iter() {
        let created = listing["createdAt"].as_str().unwrap_or("").to_string();
        if let Some(p) = prev.as_ref() {
            assert!(p >= &created, "expected descending createdAt: prev={}, curr={}", p, created);
        }
        prev = Some(created);
    }

    // And the filtered search with no extra criteria matches the seeds in
    // the same newest-first order
    let results = search(server, &format!("location={}", m)).await?;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["title"], "Luxury villa");
    assert_eq!(results[2]["title"], "Budget flat");
    Ok(())
}
