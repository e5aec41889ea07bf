//! Neo4j GraphQL schema endpoint.

use crate::models::report::Report;

/// POST the raw schema to `<database_url>/graphql/idl/`.
pub async fn push_to_database(
    client: &reqwest::Client,
    database_url: &str,
    db_token: &str,
    idl: String,
) -> Result<(), Report> {
    let url = format!("{}/graphql/idl/", database_url.trim_end_matches('/'));
    let failure = |reason: String, body: Option<String>| Report::Deploy {
        url: url.clone(),
        reason,
        body: body.unwrap_or_else(|| "(none)".to_string()),
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Basic {db_token}"))
        .body(idl)
        .send()
        .await
        .map_err(|e| failure(e.to_string(), None))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.ok().filter(|b| !b.is_empty());
        tracing::warn!(url = %url, status = %status, body = ?body, "schema upload rejected");
        return Err(failure(status.to_string(), body));
    }

    Ok(())
}
