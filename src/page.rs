use crate::{extract_activity_id, EmbedMap, Race};

/// Escape a user-sourced string for interpolation into HTML text or
/// attribute values. Race names and pasted embed markup both flow through
/// here before landing in the page.
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn text_or(field: &Option<String>, fallback: &str) -> String {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}

/// Distance is a bare number in some catalog entries and a string in others.
fn distance_text(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Render the collection page for the filtered races joined against the
/// embed store. Races whose strava URL yields no activity id are skipped.
pub(crate) fn render_page(races: &[Race], embeds: &EmbedMap) -> String {
    let mut rows = String::new();
    let mut total = 0usize;
    let mut completed = 0usize;

    for race in races {
        let Some(activity_id) = extract_activity_id(race.strava.as_deref().unwrap_or("")) else {
            continue;
        };
        total += 1;

        let done = embeds.contains_key(activity_id);
        if done {
            completed += 1;
        }
        let (row_class, icon) = if done { ("completed", "\u{2705}") } else { ("pending", "\u{23f3}") };
        let embed_value = embeds
            .get(activity_id)
            .map(|record| record.embed_url.as_str())
            .unwrap_or("");

        rows.push_str(&format!(
            r#"        <tr class="{row_class}" data-activity-id="{activity_id}">
            <td class="status">{icon}</td>
            <td class="date">{date}</td>
            <td class="name">{name}</td>
            <td class="distance">{distance}mi</td>
            <td class="time">{time}</td>
            <td class="actions">
                <a href="https://www.strava.com/activities/{activity_id}" target="_blank" rel="noopener"
                   class="btn btn-open" onclick="markOpened('{activity_id}')">Open Strava &#8599;</a>
            </td>
            <td class="embed-input">
                <textarea id="embed-{activity_id}" placeholder="Paste embed code here..."
                       onpaste="handlePaste(event, '{activity_id}')"
                       onchange="saveEmbed('{activity_id}')">{embed}</textarea>
                <button onclick="saveEmbed('{activity_id}')" class="btn btn-save">Save</button>
            </td>
        </tr>
"#,
            date = escape_html(&text_or(&race.date, "N/A")),
            name = escape_html(&text_or(&race.name, "Unknown")),
            distance = escape_html(&distance_text(&race.distance)),
            time = escape_html(&text_or(&race.time, "N/A")),
            embed = escape_html(embed_value),
        ));
    }

    let remaining = total - completed;
    let progress_pct = if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Strava Embed Collector</title>\n<style>");
    html.push_str(PAGE_STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");
    html.push_str(&format!(
        r#"    <h1>&#127939; Strava Embed Collector</h1>
    <p class="subtitle">Quickly collect embed codes for all race activities</p>

    <div class="progress-bar">
        <div class="progress-fill" id="progress-fill" style="width: {progress_pct:.1}%"></div>
    </div>

    <div class="stats">
        <div class="stat"><div class="stat-value" id="completed-count">{completed}</div><div class="stat-label">Completed</div></div>
        <div class="stat"><div class="stat-value" id="remaining-count">{remaining}</div><div class="stat-label">Remaining</div></div>
        <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Total Activities</div></div>
    </div>

    <div class="instructions">
        <h3>How to use:</h3>
        <ol>
            <li>Click <strong>"Open Strava"</strong> to open the activity in a new tab</li>
            <li>On Strava, click the <strong>three dots (...)</strong> menu &#8594; <strong>"Embed Activity"</strong></li>
            <li>Click <strong>"Copy Embed Code"</strong></li>
            <li>Come back here and <strong>paste</strong> into the input field (it auto-saves!)</li>
        </ol>
    </div>

    <div class="filter-buttons">
        <button class="filter-btn active" onclick="filterRows(event, 'all')">All ({total})</button>
        <button class="filter-btn" onclick="filterRows(event, 'pending')">Pending ({remaining})</button>
        <button class="filter-btn" onclick="filterRows(event, 'completed')">Completed ({completed})</button>
    </div>
"#
    ));
    html.push_str(
        r#"    <table>
        <thead>
            <tr>
                <th width="40">&#10003;</th>
                <th width="100">Date</th>
                <th>Race</th>
                <th width="80">Distance</th>
                <th width="90">Time</th>
                <th width="120">Strava</th>
                <th>Embed Code</th>
            </tr>
        </thead>
        <tbody>
"#,
    );
    html.push_str(&rows);
    html.push_str("        </tbody>\n    </table>\n</div>\n\n");
    html.push_str("<div class=\"notification\" id=\"notification\"></div>\n\n<script>");
    html.push_str(PAGE_SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

const PAGE_STYLE: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: #0a0a0a; color: #fafafa; padding: 20px; line-height: 1.6;
}
.container { max-width: 1400px; margin: 0 auto; }
h1 { color: #f88c00; margin-bottom: 10px; }
.subtitle { color: #a1a1aa; margin-bottom: 20px; }
.progress-bar {
    background: #27272a; border-radius: 10px; height: 20px;
    margin-bottom: 20px; overflow: hidden;
}
.progress-fill {
    background: linear-gradient(90deg, #f88c00, #ff9f1c);
    height: 100%; transition: width 0.3s ease;
}
.stats { display: flex; gap: 20px; margin-bottom: 20px; flex-wrap: wrap; }
.stat {
    background: #18181b; padding: 15px 25px; border-radius: 8px;
    border: 1px solid #27272a;
}
.stat-value { font-size: 24px; font-weight: bold; color: #f88c00; }
.stat-label { color: #a1a1aa; font-size: 14px; }
.instructions {
    background: #18181b; border: 1px solid #27272a; border-radius: 8px;
    padding: 20px; margin-bottom: 20px;
}
.instructions h3 { color: #f88c00; margin-bottom: 10px; }
.instructions ol { margin-left: 20px; color: #a1a1aa; }
.instructions li { margin-bottom: 8px; }
table {
    width: 100%; border-collapse: collapse; background: #18181b;
    border-radius: 8px; overflow: hidden;
}
th {
    background: #27272a; padding: 12px; text-align: left; font-weight: 600;
    color: #f88c00; position: sticky; top: 0;
}
td { padding: 10px 12px; border-bottom: 1px solid #27272a; }
tr.completed { opacity: 0.6; }
tr.completed:hover { opacity: 1; }
tr:hover { background: #1f1f23; }
.btn {
    padding: 8px 16px; border: none; border-radius: 6px; cursor: pointer;
    font-size: 14px; text-decoration: none; display: inline-block;
}
.btn-open { background: #3b82f6; color: white; }
.btn-open:hover { background: #2563eb; }
.btn-save { background: #22c55e; color: white; }
.btn-save:hover { background: #16a34a; }
.embed-input { display: flex; gap: 8px; min-width: 400px; }
.embed-input textarea {
    flex: 1; padding: 8px 12px; border: 1px solid #27272a; border-radius: 6px;
    background: #0a0a0a; color: #fafafa; font-size: 11px; font-family: monospace;
    height: 50px; resize: vertical;
}
.embed-input textarea:focus { outline: none; border-color: #f88c00; }
.embed-input textarea.saved { border-color: #22c55e; background: #052e16; }
.filter-buttons { margin-bottom: 15px; display: flex; gap: 10px; }
.filter-btn {
    padding: 8px 16px; background: #27272a; border: 1px solid #3f3f46;
    color: #fafafa; border-radius: 6px; cursor: pointer;
}
.filter-btn.active { background: #f88c00; border-color: #f88c00; color: #0a0a0a; }
.notification {
    position: fixed; bottom: 20px; right: 20px; background: #22c55e;
    color: white; padding: 12px 20px; border-radius: 8px; display: none;
}
.notification.error { background: #dc2626; }
"#;

const PAGE_SCRIPT: &str = r##"
function extractEmbedUrl(text) {
    // New Strava format keeps the whole placeholder div.
    if (/data-embed-id=["'](\d+)["']/.test(text)) return text.trim();
    // Old iframe format: keep the src URL.
    var iframe = text.match(/src=["']([^"']+strava[^"']+)/);
    if (iframe) return iframe[1];
    return text.trim();
}

function handlePaste(event, activityId) {
    setTimeout(function () {
        var input = document.getElementById('embed-' + activityId);
        input.value = extractEmbedUrl(input.value);
        saveEmbed(activityId);
    }, 10);
}

function saveEmbed(activityId) {
    var input = document.getElementById('embed-' + activityId);
    var embedUrl = input.value.trim();
    if (!embedUrl) return;

    fetch('/save', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ activity_id: activityId, embed_url: embedUrl })
    })
    .then(function (response) {
        return response.json().then(function (data) { return { ok: response.ok, data: data }; });
    })
    .then(function (result) {
        if (result.ok && result.data.success) {
            input.classList.add('saved');
            var row = document.querySelector('tr[data-activity-id="' + activityId + '"]');
            row.classList.add('completed');
            row.classList.remove('pending');
            row.querySelector('.status').textContent = '✅';
            showNotification('✅ Saved!', false);
            updateStats();
        } else {
            showNotification('Save failed: ' + (result.data.error || 'unknown error'), true);
        }
    })
    .catch(function () {
        showNotification('Save failed: network error', true);
    });
}

function markOpened(activityId) {
    var row = document.querySelector('tr[data-activity-id="' + activityId + '"]');
    row.style.background = '#1a1a2e';
}

function showNotification(text, isError) {
    var notif = document.getElementById('notification');
    notif.textContent = text;
    notif.classList.toggle('error', isError);
    notif.style.display = 'block';
    setTimeout(function () { notif.style.display = 'none'; }, 2500);
}

function updateStats() {
    var completed = document.querySelectorAll('tbody tr.completed').length;
    var total = document.querySelectorAll('tbody tr').length;
    document.getElementById('completed-count').textContent = completed;
    document.getElementById('remaining-count').textContent = total - completed;
    document.getElementById('progress-fill').style.width =
        (total > 0 ? completed / total * 100 : 0) + '%';
}

function filterRows(event, filter) {
    document.querySelectorAll('.filter-btn').forEach(function (btn) {
        btn.classList.remove('active');
    });
    event.target.classList.add('active');

    document.querySelectorAll('tbody tr').forEach(function (row) {
        var done = row.classList.contains('completed');
        if (filter === 'all') row.style.display = '';
        else if (filter === 'pending') row.style.display = done ? 'none' : '';
        else row.style.display = done ? '' : 'none';
    });
}
"##;
