use crate::application::use_cases::admin::AdminView;
use crate::domain::submission::{DisplayRecord, Submission};

const HIDDEN_MANITTO: &str = "🔒";

/// Escape text for use inside HTML element content and quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }}
  table {{ border-collapse: collapse; width: 100%; }}
  th, td {{ border: 1px solid #ccc; padding: 0.4rem; text-align: left; }}
  .message {{ color: #b00020; }}
  form.inline {{ display: inline; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

pub fn form_page() -> String {
    layout(
        "마니또 뽑기",
        r#"<h1>🎁 마니또 뽑기</h1>
<form method="post" action="/form">
  <p><label>내 이름 <input type="text" name="name" required></label></p>
  <p><label>뽑은 마니또 <input type="text" name="manitto" required></label></p>
  <p><button type="submit">제출</button></p>
</form>"#,
    )
}

pub fn result_page(name: Option<&str>, manitto: Option<&str>) -> String {
    let body = format!(
        r#"<h1>🎄 결과</h1>
<p><strong>{name}</strong> 님의 마니또는 <strong>{manitto}</strong> 입니다.</p>
<p><a href="/form">처음으로</a></p>"#,
        name = escape_html(name.unwrap_or("")),
        manitto = escape_html(manitto.unwrap_or("")),
    );
    layout("마니또 결과", &body)
}

pub fn admin_page(view: &AdminView) -> String {
    let sort_query = if view.sort_by_name { "?sort=1" } else { "" };
    let message = view
        .message
        .as_deref()
        .map(|m| format!(r#"<p class="message">{}</p>"#, escape_html(m)))
        .unwrap_or_default();

    let sort_toggle = if view.sort_by_name {
        r#"<a href="/admin">제출 순으로 보기</a>"#
    } else {
        r#"<a href="/admin?sort=1">이름 순으로 보기</a>"#
    };

    let rows: String = view
        .records
        .iter()
        .map(|entry| admin_row(entry, view.show_full))
        .collect();

    let body = format!(
        r#"<h1>관리자 페이지</h1>
{message}
<form method="post" action="/admin{sort_query}">
  <label>비밀번호 <input type="password" name="password"></label>
  <button type="submit">마니또 보기</button>
</form>
<p>{sort_toggle} · <a href="/admin/export_csv{sort_query}">CSV 다운로드</a></p>
<h2>전체 기록 ({total}건)</h2>
<table>
<thead><tr><th>#</th><th>이름</th><th>마니또</th><th>시간</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<h2>최근 제출</h2>
{recent}"#,
        message = message,
        sort_query = sort_query,
        sort_toggle = sort_toggle,
        total = view.records.len(),
        rows = rows,
        recent = recent_list(&view.recent),
    );
    layout("관리자 페이지", &body)
}

fn admin_row(entry: &DisplayRecord, show_full: bool) -> String {
    let manitto = if show_full {
        escape_html(&entry.record.manitto)
    } else {
        HIDDEN_MANITTO.to_string()
    };
    format!(
        r#"<tr><td>{number}</td><td>{name}</td><td>{manitto}</td><td>{time}</td><td><a href="/admin/edit/{index}">수정</a> <form class="inline" method="post" action="/admin/delete/{index}"><button type="submit">삭제</button></form></td></tr>
"#,
        number = entry.index + 1,
        name = escape_html(&entry.record.name),
        manitto = manitto,
        time = escape_html(&entry.record.time),
        index = entry.index,
    )
}

fn recent_list(recent: &[Submission]) -> String {
    if recent.is_empty() {
        return "<p>아직 제출된 기록이 없습니다.</p>".to_string();
    }
    let items: String = recent
        .iter()
        .map(|record| {
            format!(
                "<li>{} ({})</li>\n",
                escape_html(&record.name),
                escape_html(&record.time)
            )
        })
        .collect();
    format!("<ul>\n{}</ul>", items)
}

pub fn edit_page(entry: &DisplayRecord) -> String {
    let body = format!(
        r#"<h1>이름 수정</h1>
<p>기록 #{number} · {time}</p>
<form method="post" action="/admin/edit/{index}">
  <p><label>이름 <input type="text" name="name" value="{name}"></label></p>
  <p><button type="submit">저장</button> <a href="/admin">취소</a></p>
</form>"#,
        number = entry.index + 1,
        time = escape_html(&entry.record.time),
        index = entry.index,
        name = escape_html(&entry.record.name),
    );
    layout("이름 수정", &body)
}
