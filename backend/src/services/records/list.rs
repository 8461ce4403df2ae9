use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::services::records::query::{record_from_row, RecordFilter, RECORD_COLUMNS};
use actix_web::{web, HttpResponse, Responder};
use common::model::pagination::Pagination;
use common::requests::RecordsQuery;
use common::responses::RecordsPage;
use rusqlite::{params_from_iter, Connection, ToSql};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 50;

pub async fn process(
    query: web::Query<RecordsQuery>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> impl Responder {
    let query = query.into_inner();
    match db.run(move |conn| list_records(conn, query)).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

/// Returns one page of records, newest first, and the total for the same filter.
///
/// Records created in the same call share `created_at`; `seq` breaks the tie so the
/// last inserted row comes first.
pub fn list_records(conn: &Connection, query: RecordsQuery) -> Result<RecordsPage, AppError> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if page == 0 || limit == 0 {
        return Err(AppError::InvalidPayload(
            "page and limit must be at least 1".to_string(),
        ));
    }

    let filter = RecordFilter::new(query.batch_id, query.search);
    let (where_clause, values) = filter.where_clause();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM audit_records {}", where_clause),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;
    let pagination = Pagination::new(page, limit, total.max(0) as u64);

    // SQLite integers are signed; anything past i64::MAX is past the end anyway.
    let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);
    if offset >= total {
        return Ok(RecordsPage {
            data: Vec::new(),
            pagination,
        });
    }
    let limit = i64::from(limit);

    let mut bound: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
    bound.push(&limit);
    bound.push(&offset);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM audit_records {} \
         ORDER BY created_at DESC, seq DESC LIMIT ?{} OFFSET ?{}",
        RECORD_COLUMNS,
        where_clause,
        values.len() + 1,
        values.len() + 2
    ))?;
    let data = stmt
        .query_map(bound.as_slice(), record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordsPage { data, pagination })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::services::ingest::store::{insert_batch, insert_records};
    use common::model::record::Payload;
    use serde_json::json;

    fn numbered(n: usize) -> Vec<Payload> {
        (0..n)
            .map(|i| json!({ "n": i, "ref": format!("TXN{:03}", i) }).as_object().cloned().unwrap())
            .collect()
    }

    fn query(batch_id: &str, page: Option<u32>, limit: Option<u32>) -> RecordsQuery {
        RecordsQuery {
            batch_id: Some(batch_id.to_string()),
            page,
            limit,
            search: None,
        }
    }

    #[test]
    fn second_page_of_120_records() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "a.csv", "A").unwrap();
        insert_records(&conn, &batch.id, &numbered(120)).unwrap();

        let page = list_records(&conn, query(&batch.id, Some(2), Some(50))).unwrap();
        assert_eq!(page.pagination, Pagination::new(2, 50, 120));
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.data.len(), 50);
        // Newest first: the 51st newest is row 69, the 100th newest is row 20.
        assert_eq!(page.data[0].data["n"], json!(69));
        assert_eq!(page.data[49].data["n"], json!(20));
    }

    #[test]
    fn defaults_to_first_page_of_fifty() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "a.csv", "A").unwrap();
        insert_records(&conn, &batch.id, &numbered(60)).unwrap();

        let page = list_records(&conn, query(&batch.id, None, None)).unwrap();
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.limit, 50);
        assert_eq!(page.data.len(), 50);
        assert_eq!(page.data[0].data["n"], json!(59));
    }

    #[test]
    fn without_batch_lists_everything() {
        let conn = test_connection();
        let a = insert_batch(&conn, "a.csv", "A").unwrap();
        let b = insert_batch(&conn, "b.csv", "B").unwrap();
        insert_records(&conn, &a.id, &numbered(3)).unwrap();
        insert_records(&conn, &b.id, &numbered(4)).unwrap();

        let page = list_records(&conn, RecordsQuery::default()).unwrap();
        assert_eq!(page.pagination.total, 7);
    }

    #[test]
    fn search_filters_page_and_total_alike() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "a.csv", "A").unwrap();
        insert_records(&conn, &batch.id, &numbered(30)).unwrap();

        let page = list_records(
            &conn,
            RecordsQuery {
                batch_id: Some(batch.id.clone()),
                page: Some(1),
                limit: Some(5),
                search: Some("TXN01".into()),
            },
        )
        .unwrap();
        assert_eq!(page.pagination.total, 10);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.data.len(), 5);
        assert!(page
            .data
            .iter()
            .all(|r| r.data["ref"].as_str().unwrap().starts_with("TXN01")));

        // Case-sensitive, over the whole serialized payload (keys included).
        let lower = list_records(
            &conn,
            RecordsQuery {
                search: Some("txn01".into()),
                ..query(&batch.id, None, None)
            },
        )
        .unwrap();
        assert_eq!(lower.pagination.total, 0);

        let by_key = list_records(
            &conn,
            RecordsQuery {
                search: Some("\"ref\"".into()),
                ..query(&batch.id, None, None)
            },
        )
        .unwrap();
        assert_eq!(by_key.pagination.total, 30);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "a.csv", "A").unwrap();
        insert_records(&conn, &batch.id, &numbered(3)).unwrap();

        let page = list_records(&conn, query(&batch.id, Some(5), Some(2))).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[test]
    fn huge_page_and_limit_give_an_empty_page() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "a.csv", "A").unwrap();
        insert_records(&conn, &batch.id, &numbered(3)).unwrap();

        let huge = query(&batch.id, Some(u32::MAX), Some(u32::MAX));
        let page = list_records(&conn, huge).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 1);

        let all = list_records(&conn, query(&batch.id, Some(1), Some(u32::MAX))).unwrap();
        assert_eq!(all.data.len(), 3);
    }

    #[test]
    fn empty_page_and_limit_fall_back_to_defaults() {
        let query =
            web::Query::<RecordsQuery>::from_query("batchId=b1&page=&limit=&search=").unwrap();
        assert_eq!(query.page, None);
        assert_eq!(query.limit, None);

        let conn = test_connection();
        let batch = insert_batch(&conn, "a.csv", "A").unwrap();
        insert_records(&conn, &batch.id, &numbered(60)).unwrap();
        let query = web::Query::<RecordsQuery>::from_query(&format!(
            "batchId={}&page=&limit=&search=",
            batch.id
        ))
        .unwrap();

        let page = list_records(&conn, query.into_inner()).unwrap();
        assert_eq!(page.pagination.page, DEFAULT_PAGE);
        assert_eq!(page.pagination.limit, DEFAULT_LIMIT);
        assert_eq!(page.data.len(), 50);
    }

    #[actix_web::test]
    async fn blank_paging_parameters_over_http() {
        let app = crate::services::test_app!();
        let req = actix_web::test::TestRequest::get()
            .uri("/api/records?batchId=b1&page=&limit=&search=")
            .to_request();
        let page: RecordsPage = actix_web::test::call_and_read_body_json(&app, req).await;
        assert!(page.data.is_empty());
        assert_eq!(page.pagination, Pagination::new(DEFAULT_PAGE, DEFAULT_LIMIT, 0));

        let req = actix_web::test::TestRequest::get()
            .uri("/api/records?page=4294967295&limit=4294967295")
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        assert!(web::Query::<RecordsQuery>::from_query("page=two").is_err());
        let query = web::Query::<RecordsQuery>::from_query("page=2&limit=10").unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn zero_page_or_limit_is_invalid() {
        let conn = test_connection();
        assert!(matches!(
            list_records(&conn, query("b", Some(0), None)),
            Err(AppError::InvalidPayload(_))
        ));
        assert!(matches!(
            list_records(&conn, query("b", None, Some(0))),
            Err(AppError::InvalidPayload(_))
        ));
    }
}
