//! Raw request command implementation.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use pillbox_http::{ApiRequest, Method};

use crate::output;
use crate::session::CliSession;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Path relative to the API URL, e.g. /medications
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// Send without an access token
    #[arg(long)]
    pub no_auth: bool,
}

pub async fn run(args: RequestArgs, session: &CliSession) -> Result<()> {
    let request = build_request(&args)?;

    let envelope = session
        .client()
        .request::<Value>(&request)
        .await
        .with_context(|| format!("{} {} failed", request.method(), request.path()))?;

    if !envelope.message.is_empty() {
        eprintln!("{}", envelope.message.dimmed());
    }
    output::json_pretty(&envelope.data)
}

fn build_request(args: &RequestArgs) -> Result<ApiRequest> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|_| anyhow!("Invalid HTTP method '{}'", args.method))?;

    let mut request = ApiRequest::new(method, args.path.as_str());

    if let Some(data) = &args.data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.body(body);
    }

    for pair in &args.query {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Query parameter '{}' must be KEY=VALUE", pair))?;
        request = request.query(key, value);
    }

    if args.no_auth {
        request = request.unauthenticated();
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillbox_http::Auth;

    fn args(method: &str) -> RequestArgs {
        RequestArgs {
            method: method.to_string(),
            path: "/medications".to_string(),
            data: None,
            query: Vec::new(),
            no_auth: false,
        }
    }

    #[test]
    fn builds_authenticated_get() {
        let request = build_request(&args("get")).unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.auth_mode(), Auth::Access);
    }

    #[test]
    fn parses_body_query_and_auth() {
        let mut args = args("post");
        args.data = Some(r#"{"name": "Aspirin"}"#.to_string());
        args.query = vec!["page=2".to_string()];
        args.no_auth = true;

        let request = build_request(&args).unwrap();
        assert_eq!(request.body_json().unwrap()["name"], "Aspirin");
        assert_eq!(request.query_params(), &[("page".to_string(), "2".to_string())]);
        assert_eq!(request.auth_mode(), Auth::None);
    }

    #[test]
    fn rejects_bad_input() {
        let mut bad_json = args("post");
        bad_json.data = Some("{".to_string());
        assert!(build_request(&bad_json).is_err());

        let mut bad_query = args("get");
        bad_query.query = vec!["page".to_string()];
        assert!(build_request(&bad_query).is_err());

        assert!(build_request(&args("GE T")).is_err());
    }
}
