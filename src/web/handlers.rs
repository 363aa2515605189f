use actix_web::http::{header, StatusCode};
use actix_web::{get, web, HttpRequest, HttpResponse};
use tracing::{debug, error, info};

use crate::hls::{render, Flavor, HLS_CONTENT_TYPE};
use crate::web::models::{AppState, ProxyQuery};

/// Upstream response headers worth passing through to the player.
const FORWARDED_HEADERS: [&str; 3] = ["content-type", "content-range", "accept-ranges"];

// Handler for the master/audio/video manifests of one video
#[get("/yt/{id}/{playlist}")]
pub async fn playlist(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (id, playlist) = path.into_inner();

    let Some(flavor) = Flavor::from_segment(&playlist) else {
        return HttpResponse::NotFound().finish();
    };

    info!("requesting yt video {} ({:?})", id, flavor);

    match state.resolver.resolve(&id).await {
        Ok(entry) => HttpResponse::Ok()
            .content_type(HLS_CONTENT_TYPE)
            .body(render(&entry, flavor, &state.base_url)),
        Err(e) => {
            // Players treat an empty manifest as a failed load.
            error!("Failed to resolve {}: {}", id, e);
            HttpResponse::BadGateway()
                .content_type(HLS_CONTENT_TYPE)
                .finish()
        }
    }
}

// Passthrough for the URLs embedded by the manifest rewriter. One level only:
// bodies are streamed back as-is, never parsed or rewritten.
pub async fn proxy(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ProxyQuery>,
) -> HttpResponse {
    let url = match reqwest::Url::parse(&query.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => return HttpResponse::BadRequest().finish(),
    };

    debug!("proxying {}", url);

    let mut upstream = state.client.get(url);
    if let Some(range) = req
        .headers()
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
    {
        upstream = upstream.header("range", range);
    }

    let res = match upstream.send().await {
        Ok(res) => res,
        Err(e) => {
            error!("Proxy request failed: {}", e);
            return HttpResponse::BadGateway().finish();
        }
    };

    let status = StatusCode::from_u16(res.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = HttpResponse::build(status);
    for name in FORWARDED_HEADERS {
        if let Some(value) = res.headers().get(name).and_then(|v| v.to_str().ok()) {
            response.insert_header((name, value.to_string()));
        }
    }
    if let Some(len) = res.content_length() {
        response.no_chunking(len);
    }

    response.streaming(res.bytes_stream())
}
