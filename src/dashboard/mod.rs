use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::context::DataContext;
use crate::pipeline::PipelineReport;
use crate::views;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<DataContext>,
    pub title: String,
    pub default_player: String,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/roster", get(roster_handler))
        .route("/api/ranking", get(ranking_handler))
        .route("/api/players/:name", get(player_handler))
        .route("/api/summary", get(summary_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the dashboard HTML page, injecting the title and default player.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let html = DASHBOARD_HTML
        .replace("{{TITLE}}", &escape_html(&state.title))
        .replace(
            r#"<body>"#,
            &format!(
                r#"<body data-default-player="{}">"#,
                escape_html(&state.default_player)
            ),
        );
    Html(html)
}

#[derive(Serialize)]
struct RosterResponse<'a> {
    players: &'a [String],
    default_player: &'a str,
}

/// GET /api/roster
async fn roster_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(RosterResponse {
        players: &state.ctx.rules.roster,
        default_player: &state.default_player,
    })
    .into_response()
}

/// GET /api/ranking
async fn ranking_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(&state.ctx.ranking_chart).into_response()
}

/// GET /api/players/:name
async fn player_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    debug!("Selection changed to {}", name);
    Json(views::player_view(&state.ctx, &name))
}

#[derive(Serialize)]
struct Summary<'a> {
    roster: &'a [String],
    excluded_puzzles: &'a BTreeSet<u32>,
    max_puzzle: Option<u32>,
    cohort_puzzles: &'a BTreeSet<u32>,
    report: &'a PipelineReport,
    loaded_at: DateTime<Utc>,
}

/// GET /api/summary
async fn summary_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ctx = &state.ctx;
    Json(Summary {
        roster: &ctx.rules.roster,
        excluded_puzzles: &ctx.rules.excluded_puzzles,
        max_puzzle: ctx.rules.max_puzzle,
        cohort_puzzles: &ctx.tables.cohort_puzzles,
        report: &ctx.tables.report,
        loaded_at: ctx.loaded_at,
    })
    .into_response()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{TITLE}}</title>
<style>
  :root {
    --bg: #060606;
    --card: #161616;
    --border: #333;
    --accent: #2a9fd6;
    --green: #77b300;
    --text: #e0e0e0;
    --muted: #888;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { padding: 1.5rem 2rem; text-align: center; }
  header h1 { font-size: 1.9rem; font-weight: 700; color: var(--green); }
  main { padding: 0 2rem 2rem; display: grid; gap: 1.5rem; }
  .two-col { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
  @media (max-width: 900px) { .two-col { grid-template-columns: 1fr; } }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 8px; padding: 1rem; }
  .panel-header { color: var(--muted); margin-bottom: .8rem; }
  select { width: 100%; padding: .45rem; background: #222; color: var(--text); border: 1px solid var(--border); border-radius: 4px; margin-bottom: 1rem; }
  .cards { display: grid; grid-template-columns: 1fr 1fr; gap: .8rem; }
  .cards .wide { grid-column: span 2; }
  .stat-card { border: 1px solid var(--border); border-radius: 6px; overflow: hidden; }
  .stat-card .label { background: #222; color: var(--muted); font-size: .85rem; padding: .5rem .8rem; }
  .stat-card .value { font-size: 1.8rem; font-weight: 700; padding: .7rem .8rem; }
  .stat-card .value.empty { color: var(--muted); font-size: 1.1rem; }
  canvas { width: 100% !important; display: block; }
  .notice { color: var(--muted); text-align: center; padding: 1rem; }
</style>
</head>
<body>
<header><h1>{{TITLE}}</h1></header>

<main>
  <div class="two-col">
    <div class="panel">
      <div class="panel-header">Player Selection</div>
      <select id="player-select"></select>
      <div class="cards">
        <div class="stat-card wide"><div class="label" id="l-games">Number of Wordles Used</div><div class="value" id="v-games">–</div></div>
        <div class="stat-card"><div class="label" id="l-avg-easy">Actual Avg. Fails on Easy Wordles</div><div class="value" id="v-avg-easy">–</div></div>
        <div class="stat-card"><div class="label" id="l-avg-hard">Actual Avg. Fails on Hard Wordles</div><div class="value" id="v-avg-hard">–</div></div>
        <div class="stat-card"><div class="label" id="l-pred-easy">Predicted Avg. Fails on Easy Wordles</div><div class="value" id="v-pred-easy">–</div></div>
        <div class="stat-card"><div class="label" id="l-pred-hard">Predicted Avg. Fails on Hard Wordles</div><div class="value" id="v-pred-hard">–</div></div>
      </div>
    </div>

    <div class="panel">
      <div class="panel-header">Player Ranking</div>
      <canvas id="ranking-chart"></canvas>
    </div>
  </div>

  <div class="two-col">
    <div class="panel">
      <div class="panel-header">Predicted Performance</div>
      <canvas id="density-chart"></canvas>
    </div>
    <div class="panel">
      <div class="panel-header">Actual Performance</div>
      <canvas id="histogram-chart"></canvas>
    </div>
  </div>
</main>

<script>
const PALETTE = ['#636efa', '#ef553b', '#00cc96', '#ab63fa', '#ffa15a', '#19d3f3', '#ff6692', '#b6e880'];
const CHART_H = 260;

function sizeCanvas(canvas) {
  const W = canvas.parentElement.clientWidth - 32;
  canvas.width = W;
  canvas.height = CHART_H;
  const ctx = canvas.getContext('2d');
  ctx.clearRect(0, 0, W, CHART_H);
  ctx.font = '12px system-ui, sans-serif';
  return [ctx, W, CHART_H];
}

function drawRanking(bars) {
  const [ctx, W, H] = sizeCanvas(document.getElementById('ranking-chart'));
  if (!bars.length) { ctx.fillStyle = '#888'; ctx.fillText('No complete puzzles', 10, 20); return; }
  const left = 70, pad = 6;
  const max = Math.max(...bars.map(b => b.fails), 1);
  const rowH = H / bars.length;
  bars.forEach((b, i) => {
    const y = i * rowH + pad;
    const w = (W - left - 10) * (b.fails / max);
    ctx.fillStyle = PALETTE[i % PALETTE.length];
    ctx.fillRect(left, y, w, rowH - 2 * pad);
    ctx.fillStyle = '#e0e0e0';
    ctx.textAlign = 'right';
    ctx.fillText(b.name, left - 6, y + rowH / 2);
    ctx.textAlign = 'left';
    ctx.fillText(String(b.fails), left + 4, y + rowH / 2);
  });
}

// Draw one panel per difficulty; `draw` renders the points of one panel.
function drawFacets(canvasId, chart, draw) {
  const [ctx, W, H] = sizeCanvas(document.getElementById(canvasId));
  const facets = chart.facets;
  if (!facets.length) { ctx.fillStyle = '#888'; ctx.fillText('No data', 10, 20); return; }
  const panelW = W / facets.length;
  const top = 20, bottom = 20;
  const yMax = chart.y_range[1];
  const xMax = Math.max(1, ...facets.flatMap(f => f.points.map(p => p.fails)));
  facets.forEach((f, i) => {
    const x0 = i * panelW + 8, w = panelW - 16, h = H - top - bottom;
    ctx.fillStyle = '#e0e0e0';
    ctx.textAlign = 'center';
    ctx.fillText('Difficulty=' + f.difficulty, x0 + w / 2, 12);
    for (let v = 0; v <= xMax; v++) ctx.fillText(String(v), x0 + (v + 0.5) * w / (xMax + 1), H - 4);
    const toX = v => x0 + (v + 0.5) * w / (xMax + 1);
    const toY = v => top + h - Math.min(v, yMax) / yMax * h;
    draw(ctx, f.points, PALETTE[i % PALETTE.length], { x0, w, h, top, toX, toY, slot: w / (xMax + 1) });
  });
}

function drawHistogram(chart) {
  drawFacets('histogram-chart', chart, (ctx, points, color, g) => {
    points.forEach(p => {
      const y = g.toY(p.count);
      ctx.fillStyle = color;
      ctx.fillRect(g.toX(p.fails) - g.slot * 0.45, y, g.slot * 0.9, g.top + g.h - y);
      ctx.fillStyle = '#e0e0e0';
      ctx.fillText(String(p.count), g.toX(p.fails), y - 3);
    });
  });
}

function drawDensity(chart) {
  drawFacets('density-chart', chart, (ctx, points, color, g) => {
    if (!points.length) return;
    ctx.fillStyle = color + '66';
    ctx.strokeStyle = color;
    ctx.lineWidth = 2;
    ctx.beginPath();
    ctx.moveTo(g.toX(points[0].fails), g.top + g.h);
    points.forEach(p => ctx.lineTo(g.toX(p.fails), g.toY(p.density)));
    ctx.lineTo(g.toX(points[points.length - 1].fails), g.top + g.h);
    ctx.closePath();
    ctx.fill();
    ctx.beginPath();
    points.forEach((p, i) => i === 0 ? ctx.moveTo(g.toX(p.fails), g.toY(p.density)) : ctx.lineTo(g.toX(p.fails), g.toY(p.density)));
    ctx.stroke();
  });
}

function setCard(key, card) {
  const el = document.getElementById('v-' + key);
  el.textContent = card.text;
  el.className = 'value' + (card.value == null ? ' empty' : '');
  document.getElementById('l-' + key).textContent = card.label;
}

async function loadPlayer(name) {
  const r = await fetch('/api/players/' + encodeURIComponent(name));
  if (!r.ok) return;
  const v = await r.json();
  setCard('games', v.games_played);
  setCard('avg-easy', v.avg_fails_easy);
  setCard('avg-hard', v.avg_fails_hard);
  setCard('pred-easy', v.predicted_easy);
  setCard('pred-hard', v.predicted_hard);
  drawHistogram(v.fails_distribution);
  drawDensity(v.predicted_density);
}

async function loadRanking() {
  const r = await fetch('/api/ranking');
  if (!r.ok) return;
  const chart = await r.json();
  drawRanking(chart.bars);
}

async function init() {
  const r = await fetch('/api/roster');
  if (!r.ok) return;
  const roster = await r.json();
  const select = document.getElementById('player-select');
  select.innerHTML = '';
  roster.players.forEach(p => {
    const opt = document.createElement('option');
    opt.value = p;
    opt.textContent = p;
    select.appendChild(opt);
  });
  select.value = document.body.dataset.defaultPlayer || roster.default_player;
  select.addEventListener('change', () => loadPlayer(select.value));
  await Promise.all([loadRanking(), loadPlayer(select.value)]);
}

init();
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{Difficulty, OutcomeRecord, Prediction};
    use crate::pipeline::CohortRules;
    use serde_json::Value;

    fn state() -> AppState {
        let roster = vec!["Da.M".to_string(), "Ka.W".to_string()];
        let mut outcomes = Vec::new();
        for (name, fails) in [("Da.M", 2), ("Ka.W", 1)] {
            for (puzzle, difficulty) in [(10, Difficulty::Easy), (11, Difficulty::Hard)] {
                outcomes.push(OutcomeRecord {
                    name: name.into(),
                    puzzle_num: puzzle,
                    fails: Some(fails),
                    difficulty,
                });
            }
        }
        let predictions = vec![Prediction {
            name: "Da.M".into(),
            difficulty: Difficulty::Easy,
            prediction: 1.5,
        }];
        let ctx = DataContext::build(
            CohortRules::new(roster, [421], None),
            &outcomes,
            predictions,
            Vec::new(),
        );
        AppState {
            ctx: Arc::new(ctx),
            title: "Scores & <Stats>".into(),
            default_player: "Ka.W".into(),
        }
    }

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state())).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn index_injects_escaped_title_and_default_player() {
        let base = spawn_server().await;
        let body = reqwest::get(&base).await.unwrap().text().await.unwrap();
        assert!(body.contains("<title>Scores &amp; &lt;Stats&gt;</title>"));
        assert!(body.contains(r#"<body data-default-player="Ka.W">"#));
    }

    #[tokio::test]
    async fn roster_endpoint_lists_players_and_default() {
        let base = spawn_server().await;
        let roster: Value = reqwest::get(format!("{base}/api/roster"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(roster["players"], serde_json::json!(["Da.M", "Ka.W"]));
        assert_eq!(roster["default_player"], "Ka.W");
    }

    #[tokio::test]
    async fn ranking_endpoint_lists_best_player_first() {
        let base = spawn_server().await;
        let chart: Value = reqwest::get(format!("{base}/api/ranking"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(chart["bars"][0]["name"], "Ka.W");
        assert_eq!(chart["bars"][0]["fails"], 2);
        assert_eq!(chart["bars"][1]["fails"], 4);
    }

    #[tokio::test]
    async fn player_endpoint_returns_full_bundle() {
        let base = spawn_server().await;
        let view: Value = reqwest::get(format!("{base}/api/players/Da.M"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["found"], true);
        assert_eq!(view["games_played"]["text"], "2");
        assert_eq!(view["avg_fails_easy"]["text"], "2.00");
        assert_eq!(view["predicted_easy"]["text"], "1.50");
        assert_eq!(view["predicted_hard"]["text"], "no data");
        assert_eq!(view["fails_distribution"]["facets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_player_degrades_to_no_data() {
        let base = spawn_server().await;
        let resp = reqwest::get(format!("{base}/api/players/Nobody")).await.unwrap();
        assert!(resp.status().is_success());
        let view: Value = resp.json().await.unwrap();
        assert_eq!(view["found"], false);
        assert_eq!(view["games_played"]["text"], "no data");
    }

    #[tokio::test]
    async fn summary_reports_cohort() {
        let base = spawn_server().await;
        let summary: Value = reqwest::get(format!("{base}/api/summary"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(summary["cohort_puzzles"], serde_json::json!([10, 11]));
        assert_eq!(summary["report"]["rows_read"], 4);
        assert_eq!(summary["excluded_puzzles"], serde_json::json!([421]));
        assert!(summary["loaded_at"].is_string());
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(escape_html(r#"a&b<"c">"#), "a&amp;b&lt;&quot;c&quot;&gt;");
    }
}
