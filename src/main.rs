// region:    --- Imports
use auction_page::bidding::model::{AMOUNT_INPUT_NAME, BID_FORM_ID, CURRENT_BID_KEY, MIN_BID_KEY};
use auction_page::config::PageConfig;
use auction_page::countdown::{SystemClock, COUNTDOWN_CLASS, END_TIME_KEY};
use auction_page::dom::Document;
use auction_page::flash::{CONTAINER_CLASS, FLASH_CLASS};
use auction_page::format::{format_currency, format_date};
use auction_page::likes::HttpToggleClient;
use auction_page::page::AuctionPage;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

// region:    --- Demo Page
/// 서버가 렌더링한 경매 상세 페이지를 흉내 낸 문서
fn demo_document() -> Document {
    let doc = Document::new();
    let container = doc.element("main").class(CONTAINER_CLASS).append_to(doc.body());

    doc.element("div")
        .class(&format!("{} flash-success", FLASH_CLASS))
        .text("Välkommen tillbaka!")
        .append_to(container);

    let end_time = (Utc::now() + Duration::seconds(3)).to_rfc3339();
    doc.element("div")
        .class(COUNTDOWN_CLASS)
        .data(END_TIME_KEY, &end_time)
        .append_to(container);

    let input = doc
        .element("input")
        .attr("name", AMOUNT_INPUT_NAME)
        .value("100")
        .build();
    doc.element("form")
        .id(BID_FORM_ID)
        .data(CURRENT_BID_KEY, "100")
        .data(MIN_BID_KEY, "150")
        .child(input)
        .append_to(container);

    doc
}
// endregion: --- Demo Page

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = PageConfig::from_env();
    let client = Arc::new(HttpToggleClient::new(&config.base_url, config.toggle_timeout)?);
    let doc = demo_document();

    let page = AuctionPage::load(doc.clone(), &config, client, Arc::new(SystemClock));

    // 현재가 이하 입찰 제출
    if let Some(form) = doc.element_by_id(BID_FORM_ID) {
        let outcome = page.submit(form);
        info!(
            "{:<12} --> 입찰 제출 차단 여부: {}",
            "Main", outcome.default_prevented
        );
    }

    info!("{:<12} --> 현재가 {}", "Main", format_currency(100.0));
    if let Some(ends) = format_date(&Utc::now().to_rfc3339()) {
        info!("{:<12} --> 기준 시각 {}", "Main", ends);
    }

    for _ in 0..5 {
        for timer in doc.elements_by_class(COUNTDOWN_CLASS) {
            println!("{}", doc.text_content(timer));
        }
        tokio::time::sleep(config.countdown_tick).await;
    }

    page.teardown();
    Ok(())
}
// endregion: --- Main
