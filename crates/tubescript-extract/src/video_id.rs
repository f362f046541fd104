//! Video id resolution from a page location.

use reqwest::Url;

const VIDEO_ID_LEN: usize = 11;

/// Derive the video id from a page location.
///
/// Accepts watch URLs (`?v=`), `youtu.be/<id>`, `/shorts/`, `/embed/`,
/// `/live/` and `/v/` paths, or a bare id.
///
/// Watch and path forms are matched on any host: the API base can point at a
/// mirror or a local double, and its pages carry the same URL shapes.
pub fn from_location(location: &str) -> Option<String> {
    let location = location.trim();
    if is_video_id(location) {
        return Some(location.to_string());
    }

    let url = Url::parse(location).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    let candidate = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_string)
    } else if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        Some(v.into_owned())
    } else {
        let mut segments = url.path_segments()?;
        match segments.next()? {
            "shorts" | "embed" | "live" | "v" => segments.next().map(str::to_string),
            _ => None,
        }
    };

    candidate.filter(|id| is_video_id(id))
}

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
