//! Render stage: produce one self-contained HTML document from the report
//! model. Section order is fixed: statistics, books, readers, debtors.

use crate::models::{format_opt_date, full_name, Gender, DATE_FORMAT};

use super::model::ReportModel;

/// Marker string the debtor section carries when nobody owes a book.
pub const NO_DEBTORS_NOTICE: &str = "No debtors: every lent book is accounted for.";

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the complete document as a single string. Nothing is written to
/// disk here; the pipeline writes the destination only after this returns.
pub fn render_html(model: &ReportModel) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Library consistency report</title>\n<style>\n");
    out.push_str(
        "body { font-family: sans-serif; margin: 2em; }\n\
         table { border-collapse: collapse; margin-bottom: 2em; }\n\
         th, td { border: 1px solid #999; padding: 4px 10px; text-align: left; }\n\
         th { background: #eee; }\n\
         .badge { padding: 1px 6px; border-radius: 4px; font-size: 0.85em; }\n\
         .taken { background: #fdd; }\n\
         .available { background: #dfd; }\n",
    );
    out.push_str("</style>\n</head>\n<body>\n");

    out.push_str("<h1>Library consistency report</h1>\n");
    out.push_str(&format!(
        "<p>Generated on {}</p>\n",
        model.generated_on.format(DATE_FORMAT)
    ));

    // Statistics
    out.push_str("<h2>Statistics</h2>\n<table>\n");
    let stats = [
        ("Total books", model.stats.total_books),
        ("Total readers", model.stats.total_readers),
        ("Books currently taken", model.stats.books_taken),
        ("Books taken this month", model.stats.taken_this_month),
        ("Readers registered this month", model.stats.registered_this_month),
    ];
    for (label, value) in stats {
        out.push_str(&format!("<tr><th>{}</th><td>{}</td></tr>\n", label, value));
    }
    out.push_str("</table>\n");

    // Books
    out.push_str("<h2>Books</h2>\n<table>\n");
    out.push_str("<tr><th>Code</th><th>Title</th><th>Author</th><th>Status</th><th>Date taken</th></tr>\n");
    for book in &model.books {
        let badge = if book.is_taken {
            "<span class=\"badge taken\">Taken</span>"
        } else {
            "<span class=\"badge available\">Available</span>"
        };
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&book.code),
            escape(&book.title),
            escape(&book.author),
            badge,
            format_opt_date(book.date_taken),
        ));
    }
    out.push_str("</table>\n");

    // Readers
    out.push_str("<h2>Readers</h2>\n<table>\n");
    out.push_str("<tr><th>ID</th><th>Name</th><th>Gender</th><th>Registered</th><th>Books held</th></tr>\n");
    for reader in &model.readers {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&reader.id),
            escape(&full_name(reader)),
            if reader.gender == Gender::Male { "M" } else { "F" },
            format_opt_date(reader.registration_date),
            escape(&reader.taken_books.join(", ")),
        ));
    }
    out.push_str("</table>\n");

    // Debtors
    out.push_str("<h2>Debtors</h2>\n");
    if model.debtors.is_empty() {
        out.push_str(&format!("<p>{}</p>\n", NO_DEBTORS_NOTICE));
    } else {
        out.push_str("<table>\n");
        out.push_str("<tr><th>Reader ID</th><th>Reader</th><th>Book code</th><th>Title</th><th>Taken on</th></tr>\n");
        for row in &model.debtors {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape(&row.reader_id),
                escape(&row.reader_name),
                escape(&row.book_code),
                escape(&row.book_title),
                format_opt_date(row.date_taken),
            ));
        }
        out.push_str("</table>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Catalog;
    use crate::report::model::build_report;
    use chrono::NaiveDate;

    #[test]
    fn empty_catalog_states_no_debtors() {
        let model = build_report(
            &Catalog::default(),
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        );
        let html = render_html(&model);
        assert!(html.contains(NO_DEBTORS_NOTICE));
        assert!(html.contains("<h2>Statistics</h2>"));
        assert!(html.contains("<h2>Books</h2>"));
        assert!(html.contains("<h2>Readers</h2>"));
        assert!(html.contains("<h2>Debtors</h2>"));
    }

    #[test]
    fn titles_are_escaped() {
        let mut catalog = Catalog::default();
        catalog
            .books
            .push(crate::models::Book::new("B1001", "Tom & Jerry", "Hanna"));
        let model = build_report(&catalog, NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        let html = render_html(&model);
        assert!(html.contains("Tom &amp; Jerry"));
    }
}
