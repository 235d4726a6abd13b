use serde::Serialize;

use crate::{
    error::AppResult,
    id::ObjectId,
    validation::{Payload, Validate},
};

pub const MAX_KEYWORD_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 300;
pub const MAX_TEXT_LEN: usize = 5000;
pub const MAX_DATE_LEN: usize = 50;
pub const MAX_SOURCE_LEN: usize = 200;
pub const MAX_URL_LEN: usize = 2048;

/// Request body for `POST /articles`.
#[derive(Debug)]
pub struct CreateArticleRequest {
    pub keyword: String,
    pub title: String,
    pub text: String,
    pub date: String,
    pub source: String,
    pub link: String,
    pub image: String,
}

impl Validate for CreateArticleRequest {
    fn validate(p: &Payload) -> AppResult<Self> {
        p.allow_only(&["keyword", "title", "text", "date", "source", "link", "image"])?;
        let keyword = p.field("keyword").trimmed().required()?.max_len(MAX_KEYWORD_LEN)?;
        let title = p.field("title").trimmed().required()?.max_len(MAX_TITLE_LEN)?;
        let text = p.field("text").trimmed().required()?.max_len(MAX_TEXT_LEN)?;
        let date = p.field("date").trimmed().required()?.max_len(MAX_DATE_LEN)?;
        let source = p.field("source").trimmed().required()?.max_len(MAX_SOURCE_LEN)?;
        let link = p.field("link").trimmed().required()?.max_len(MAX_URL_LEN)?.http_url()?;
        let image = p.field("image").trimmed().required()?.max_len(MAX_URL_LEN)?.http_url()?;
        Ok(Self {
            keyword: keyword.into_string(),
            title: title.into_string(),
            text: text.into_string(),
            date: date.into_string(),
            source: source.into_string(),
            link: link.into_string(),
            image: image.into_string(),
        })
    }
}

/// `DELETE /articles/:articleId`
#[derive(Debug)]
pub struct ArticleIdPath {
    pub article_id: ObjectId,
}

impl Validate for ArticleIdPath {
    fn validate(p: &Payload) -> AppResult<Self> {
        let article_id = p.field("articleId").required()?.object_id()?;
        Ok(Self { article_id })
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteArticleResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::{json, Value};

    fn valid_body() -> Value {
        json!({
            "keyword": "test",
            "title": "Test",
            "text": "Test content",
            "date": "2024-01-31",
            "source": "Test",
            "link": "https://test.com",
            "image": "https://test.com/img.jpg",
        })
    }

    fn validate(body: Value) -> AppResult<CreateArticleRequest> {
        CreateArticleRequest::validate(&Payload::from_json(body).unwrap())
    }

    fn message(result: AppResult<CreateArticleRequest>) -> String {
        match result.unwrap_err() {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_a_complete_article_and_trims() {
        let mut body = valid_body();
        body["keyword"] = json!("  rust  ");
        let req = validate(body).unwrap();
        assert_eq!(req.keyword, "rust");
        assert_eq!(req.link, "https://test.com");
    }

    #[test]
    fn every_field_is_required() {
        for field in ["keyword", "title", "text", "date", "source", "link", "image"] {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);
            assert_eq!(message(validate(body)), format!("\"{field}\" is required"));
        }
    }

    #[test]
    fn links_must_be_absolute_http_urls() {
        let mut body = valid_body();
        body["link"] = json!("not-a-url");
        assert_eq!(message(validate(body)), "\"link\" must be a valid uri");

        let mut body = valid_body();
        body["image"] = json!("ftp://test.com/img.jpg");
        assert_eq!(message(validate(body)), "\"image\" must be a valid uri");
    }

    #[test]
    fn text_is_bounded() {
        let mut body = valid_body();
        body["text"] = json!("x".repeat(MAX_TEXT_LEN + 1));
        assert_eq!(
            message(validate(body)),
            format!("\"text\" length must be less than or equal to {MAX_TEXT_LEN} characters long")
        );
    }

    #[test]
    fn owner_cannot_be_supplied_by_the_client() {
        let mut body = valid_body();
        body["owner"] = json!("65b7f0c2a1d3e4f5a6b7c8d9");
        assert_eq!(message(validate(body)), "\"owner\" is not allowed");
    }
}
