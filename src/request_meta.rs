use crate::models::RequestMeta;
use axum::http::HeaderMap;
use std::collections::HashMap;

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_string()
}

fn query_value(query: &HashMap<String, String>, name: &str) -> String {
    query.get(name).cloned().unwrap_or_default()
}

/// Extract request-derived lead metadata from headers and query parameters.
///
/// Geographic hints come from the proxy-supplied `x-vercel-ip-*` headers, the
/// client IP is the first comma-separated token of `x-forwarded-for` (the
/// proxy appends its own hops after it), and the five UTM campaign parameters
/// are read from the request URL. Every field falls back to the empty string.
/// The IP is used verbatim as a rate-limit key and is not validated as a
/// well-formed address.
pub fn extract(headers: &HeaderMap, query: &HashMap<String, String>) -> RequestMeta {
    let forwarded_for = header_value(headers, "x-forwarded-for");
    let ip_address = forwarded_for
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    RequestMeta {
        country: header_value(headers, "x-vercel-ip-country"),
        region: header_value(headers, "x-vercel-ip-region"),
        city: header_value(headers, "x-vercel-ip-city"),
        ip_address,
        user_agent: header_value(headers, "user-agent"),
        referrer: header_value(headers, "referer"),
        utm_source: query_value(query, "utm_source"),
        utm_medium: query_value(query, "utm_medium"),
        utm_campaign: query_value(query, "utm_campaign"),
        utm_term: query_value(query, "utm_term"),
        utm_content: query_value(query, "utm_content"),
    }
}
