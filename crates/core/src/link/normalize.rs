//! Direct-download URL rewriting.

use url::Url;

const STRIPPED_PARAMS: [&str; 2] = ["dl", "raw"];

/// Rewrite a shared link so it serves raw bytes instead of a preview page.
///
/// Every `dl` and `raw` query parameter is dropped and `dl=1` is appended.
/// Other parameters keep their order and original encoding.
///
/// # Errors
///
/// Returns the parser error if `link` is not an absolute URL.
pub fn to_direct_url(link: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(link)?;

    let mut pairs: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(key, _)| key);
            !STRIPPED_PARAMS.contains(&key)
        })
        .collect();
    pairs.push("dl=1");

    let query = pairs.join("&");
    url.set_query(Some(&query));
    Ok(url.into())
}
