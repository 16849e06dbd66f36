use crate::config::toml_config::ENV_VAR_PATTERN;
use crate::core::{ConfigProvider, RawPost};
use crate::domain::model::CollectReport;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_required_field;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const TWEET_FIELDS: &str = "id,text,author_id,created_at,lang";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ApiPost>,
    #[serde(default)]
    meta: SearchMeta,
}

#[derive(Debug, Default, Deserialize)]
struct SearchMeta {
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPost {
    id: String,
    text: String,
    #[serde(default)]
    author_id: String,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    lang: String,
}

impl From<ApiPost> for RawPost {
    fn from(post: ApiPost) -> Self {
        let created_at = post.created_at.unwrap_or_else(|| {
            tracing::debug!("Post {} has no created_at, using collection time", post.id);
            Utc::now()
        });

        RawPost {
            tweet_id: post.id,
            author_id: post.author_id,
            created_at,
            text: post.text,
            lang: post.lang,
        }
    }
}

/// Search query for one keyword/language pair; retweets are excluded.
pub fn build_query(keyword: &str, lang: &str) -> String {
    format!("{} lang:{} -is:retweet", keyword, lang)
}

/// Pages through the recent-search endpoint for every keyword and language.
pub struct PostCollector<'a, C: ConfigProvider> {
    config: &'a C,
    client: Client,
    bearer_token: String,
}

impl<'a, C: ConfigProvider> PostCollector<'a, C> {
    pub fn new(config: &'a C) -> Result<Self> {
        let bearer_token = config.bearer_token().filter(|t| !t.trim().is_empty());
        let bearer_token =
            validate_required_field("bearer_token (X_BEARER)", &bearer_token)?.to_string();

        // 未被替換的 ${VAR} 代表環境變數沒設定
        if ENV_VAR_PATTERN.is_match(&bearer_token) {
            return Err(EtlError::MissingConfigError {
                field: format!("bearer_token ({})", bearer_token),
            });
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            config,
            client,
            bearer_token,
        })
    }

    /// 依序對每個關鍵字與語言分頁抓取，直到沒有下一頁或請求額度用完
    pub async fn collect(&self) -> Result<(Vec<RawPost>, CollectReport)> {
        let mut posts = Vec::new();
        let mut report = CollectReport::default();
        let max_requests = self.config.max_requests();

        'keywords: for keyword in self.config.keywords() {
            for lang in self.config.languages() {
                if report.requests_made >= max_requests {
                    break 'keywords;
                }

                let query = build_query(keyword, lang);
                let mut next_token: Option<String> = None;

                while report.requests_made < max_requests {
                    report.requests_made += 1;

                    let page = match self.fetch_page(&query, next_token.as_deref()).await {
                        Ok(page) => page,
                        Err(EtlError::RateLimitError { attempts }) => {
                            tracing::warn!(
                                "⏳ Still rate limited after {} attempts, stopping collection",
                                attempts
                            );
                            break 'keywords;
                        }
                        Err(e) => return Err(e),
                    };

                    if page.data.is_empty() {
                        tracing::info!("No more posts for '{}'", query);
                        break;
                    }

                    let fetched = page.data.len();
                    posts.extend(page.data.into_iter().map(RawPost::from));
                    report.posts_fetched += fetched;
                    tracing::info!(
                        "📥 Fetched {} posts. Total collected: {}",
                        fetched,
                        report.posts_fetched
                    );

                    next_token = page.meta.next_token;
                    if next_token.is_none() {
                        break;
                    }

                    let delay = self.config.page_delay();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::info!(
            "✅ Collected {} posts in {} requests",
            report.posts_fetched,
            report.requests_made
        );
        Ok((posts, report))
    }

    // 429 會等待後重試同一頁；其他失敗視為空頁
    async fn fetch_page(&self, query: &str, next_token: Option<&str>) -> Result<SearchResponse> {
        let max_results = self.config.max_results().to_string();
        let mut params = vec![
            ("query", query),
            ("max_results", max_results.as_str()),
            ("tweet.fields", TWEET_FIELDS),
        ];
        if let Some(token) = next_token {
            params.push(("next_token", token));
        }

        let mut attempts = 0;
        loop {
            tracing::debug!("Requesting {} with query '{}'", self.config.api_endpoint(), query);

            let response = match self
                .client
                .get(self.config.api_endpoint())
                .bearer_auth(&self.bearer_token)
                .query(&params)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("❌ Request error: {}", e);
                    return Ok(SearchResponse::default());
                }
            };

            let status = response.status();
            tracing::debug!("API response status: {}", status);

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempts += 1;
                if attempts > self.config.rate_limit_retries() {
                    return Err(EtlError::RateLimitError { attempts });
                }
                let wait = self.config.rate_limit_wait();
                tracing::warn!("⏳ Rate limit reached. Waiting {:?}...", wait);
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::error!("❌ Error {}: {}", status, body);
                return Ok(SearchResponse::default());
            }

            return match response.json::<SearchResponse>().await {
                Ok(page) => Ok(page),
                Err(e) => {
                    tracing::error!("❌ Could not decode search response: {}", e);
                    Ok(SearchResponse::default())
                }
            };
        }
    }
}
