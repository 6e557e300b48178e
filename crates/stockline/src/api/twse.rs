//! TWSE listing scraper
//!
//! The ISIN listing page is Big5-encoded HTML. The first cell of each row
//! holds the code and the name separated by an ideographic space (U+3000).

use super::USER_AGENT;
use crate::directory::{StockDirectory, StockListing};
use crate::error::{Result, StockError};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Listed-company page (`strMode=2` is the main board)
pub const LISTING_URL: &str = "https://isin.twse.com.tw/isin/C_public.jsp?strMode=2";

/// Client for the TWSE ISIN listing page
pub struct TwseClient {
    client: Client,
    url: String,
}

impl TwseClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            url: LISTING_URL.to_string(),
        })
    }

    /// Download and parse the listing into a directory
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_directory(&self) -> Result<StockDirectory> {
        let bytes = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let (text, _, had_errors) = encoding_rs::BIG5.decode(&bytes);
        if had_errors {
            warn!("Listing page contained bytes that are not valid Big5");
        }

        let listings = parse_listings(&text)?;
        if listings.is_empty() {
            return Err(StockError::ScrapeError(
                "listing page contained no 4-digit stock codes".to_string(),
            ));
        }

        info!(count = listings.len(), "Loaded TWSE stock listings");
        Ok(StockDirectory::from_listings(listings))
    }
}

/// Parse the listing table; keeps rows whose code has exactly 4 characters
pub fn parse_listings(html: &str) -> Result<Vec<StockListing>> {
    let document = Html::parse_document(html);
    let row_selector =
        Selector::parse("tr").map_err(|e| StockError::ScrapeError(e.to_string()))?;
    let cell_selector =
        Selector::parse("td").map_err(|e| StockError::ScrapeError(e.to_string()))?;

    let listings = document
        .select(&row_selector)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>())
                .collect();
            if cells.len() < 5 {
                return None;
            }

            let (code, name) = cells[0].split_once('\u{3000}')?;
            let code = code.trim();
            if code.chars().count() != 4 {
                return None;
            }

            Some(StockListing {
                code: code.to_string(),
                name: name.trim().to_string(),
                industry: cells[4].trim().to_string(),
            })
        })
        .collect();

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html><body>
        <table class="h4">
          <tr><td>有價證券代號及名稱</td><td>國際證券辨識號碼(ISIN Code)</td><td>上市日</td><td>市場別</td><td>產業別</td><td>CFICode</td><td>備註</td></tr>
          <tr><td colspan="7"><b> 股票 </b></td></tr>
          <tr><td>1101　台泥</td><td>TW0001101004</td><td>1962/02/09</td><td>上市</td><td>水泥工業</td><td>ESVUFR</td><td></td></tr>
          <tr><td>2330　台積電</td><td>TW0002330008</td><td>1994/09/05</td><td>上市</td><td>半導體業</td><td>ESVUFR</td><td></td></tr>
          <tr><td>020000　富邦特-1</td><td>TW00002000001</td><td>2011/01/01</td><td>上市</td><td></td><td>CEOGMU</td><td></td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_listings() {
        let listings = parse_listings(SAMPLE).unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].code, "1101");
        assert_eq!(listings[0].name, "台泥");
        assert_eq!(listings[0].industry, "水泥工業");
        assert_eq!(listings[1].code, "2330");
        assert_eq!(listings[1].name, "台積電");
        assert_eq!(listings[1].industry, "半導體業");
    }

    #[test]
    fn test_parse_listings_ignores_headers_and_long_codes() {
        let listings = parse_listings(SAMPLE).unwrap();
        assert!(listings.iter().all(|l| l.code.len() == 4));
        assert!(!listings.iter().any(|l| l.name.contains("富邦特")));
    }

    #[test]
    fn test_big5_round_trip_through_decoder() {
        let (encoded, _, _) = encoding_rs::BIG5.encode(SAMPLE);
        let (decoded, _, had_errors) = encoding_rs::BIG5.decode(&encoded);
        assert!(!had_errors);
        assert_eq!(parse_listings(&decoded).unwrap().len(), 2);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_directory() {
        let client = TwseClient::new(Duration::from_secs(30)).unwrap();
        let directory = tokio_test::assert_ok!(client.fetch_directory().await);
        assert_eq!(directory.get("2330").map(|l| l.name.as_str()), Some("台積電"));
    }
}
