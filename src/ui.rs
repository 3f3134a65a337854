use crate::models::Player;
use crate::seed::demo_players;
use crate::stats::{build_standing, rank};
use crate::sync::OFFLINE_THRESHOLD;

/// The page never re-sorts or re-scores players itself: online it shows the
/// server's order and `/leaderboard` progress, offline the demo table ranked here.
pub fn render_index(ranking: &[Player]) -> String {
    let mut demo = demo_players();
    rank(&mut demo);
    let demo_progress = build_standing(&demo).map_or(0.0, |standing| standing.progress);

    let standing = build_standing(ranking);
    let (tracked_name, tracked_id, percent) = standing
        .as_ref()
        .map(|s| (s.tracked.name.clone(), s.tracked.id, s.progress * 100.0))
        .unwrap_or_default();

    INDEX_HTML
        .replace("{{TRACKED}}", &escape_html(&tracked_name))
        .replace("{{TRACKED_ID}}", &tracked_id.to_string())
        .replace("{{PROGRESS}}", &format!("{percent:.1}"))
        .replace("{{ROWS}}", &render_rows(ranking))
        .replace("{{THRESHOLD}}", &OFFLINE_THRESHOLD.to_string())
        .replace("{{DEMO_DATA}}", &demo_json(&demo))
        .replace("{{DEMO_PROGRESS}}", &demo_progress.to_string())
}

fn render_rows(ranking: &[Player]) -> String {
    ranking
        .iter()
        .enumerate()
        .map(|(index, player)| {
            format!(
                r#"<li class="row{tracked}" style="--team: {color}"><span class="rank">{rank}</span><span class="name">{name}<small>{team}</small></span><span class="assists">{assists}</span></li>"#,
                tracked = if player.is_tracked { " tracked" } else { "" },
                color = escape_html(&player.color),
                rank = index + 1,
                name = escape_html(&player.name),
                team = escape_html(&player.team),
                assists = player.assists,
            )
        })
        .collect()
}

fn demo_json(demo: &[Player]) -> String {
    serde_json::to_string(demo)
        .map(|json| json.replace("</", "<\\/"))
        .unwrap_or_else(|_| "[]".to_string())
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Assist Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .progress {
      height: 18px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    .progress .bar {
      height: 100%;
      background: var(--accent);
      transition: width 400ms ease;
    }

    ol {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    .row {
      display: grid;
      grid-template-columns: 40px 1fr auto;
      align-items: center;
      padding: 12px 16px;
      border-radius: 14px;
      background: white;
      border-left: 6px solid var(--team);
    }

    .row.tracked {
      background: #fff1ea;
      font-weight: 600;
    }

    .row small {
      display: block;
      color: #8b857d;
      font-weight: 400;
    }

    .assists {
      font-size: 1.3rem;
      color: var(--accent-2);
    }

    form {
      display: flex;
      gap: 12px;
      flex-wrap: wrap;
    }

    input {
      padding: 10px 14px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font: inherit;
    }

    button {
      border: none;
      border-radius: 12px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      color: white;
      background: var(--accent-2);
      cursor: pointer;
    }

    button.add {
      background: var(--accent);
    }

    button:disabled {
      opacity: 0.5;
      cursor: default;
    }

    .status {
      min-height: 1.2em;
      margin: 0;
      color: #8b857d;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{TRACKED}}'s assist chase</h1>
      <p class="status" id="status"></p>
    </header>

    <section>
      <div class="progress"><div class="bar" id="bar" style="width: {{PROGRESS}}%"></div></div>
      <p id="progress-label">{{PROGRESS}}% of the career record</p>
    </section>

    <form id="mutate">
      <input id="amount" type="number" min="1" value="1" aria-label="Assists" />
      <input id="game-date" type="date" aria-label="Game date" />
      <button type="submit" class="add" data-action="add">Add</button>
      <button type="submit" data-action="reduce">Reduce</button>
      <button type="button" id="undo" disabled>Undo last</button>
    </form>

    <ol id="ranking">{{ROWS}}</ol>
  </main>

  <script>
    const TRACKED_ID = {{TRACKED_ID}};
    const OFFLINE_THRESHOLD = {{THRESHOLD}};
    const DEMO_PLAYERS = {{DEMO_DATA}};
    const DEMO_PROGRESS = {{DEMO_PROGRESS}};

    const statusEl = document.getElementById('status');
    const barEl = document.getElementById('bar');
    const progressLabel = document.getElementById('progress-label');
    const rankingEl = document.getElementById('ranking');
    const undoBtn = document.getElementById('undo');
    const form = document.getElementById('mutate');

    let fingerprint = null;
    let failures = 0;
    let offline = false;
    let isMutating = false;
    let lastLogId = null;

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (ch) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[ch]);

    const fingerprintOf = (players) => players.map((p) => `${p.id}:${p.assists}`).join('|');

    // `ranking` arrives already ordered and `progress` already capped.
    const render = (ranking, progress) => {
      rankingEl.innerHTML = ranking
        .map((p, i) => `<li class="row${p.isTracked ? ' tracked' : ''}" style="--team: ${escapeHtml(p.color)}"><span class="rank">${i + 1}</span><span class="name">${escapeHtml(p.name)}<small>${escapeHtml(p.team)}</small></span><span class="assists">${p.assists}</span></li>`)
        .join('');

      if (progress != null) {
        const pct = progress * 100;
        barEl.style.width = `${pct.toFixed(1)}%`;
        progressLabel.textContent = `${pct.toFixed(1)}% of the career record`;
      }
    };

    const setStatus = (message) => {
      statusEl.textContent = message;
    };

    const refresh = async () => {
      if (isMutating) {
        return;
      }
      try {
        const [res, boardRes] = await Promise.all([fetch('/players'), fetch('/leaderboard')]);
        if (!res.ok) {
          throw new Error(`status ${res.status}`);
        }
        const body = await res.json();
        const progress = boardRes.ok ? (await boardRes.json()).data.progress : null;
        const wasOffline = offline;
        failures = 0;
        offline = false;
        const next = fingerprintOf(body.data);
        if (next !== fingerprint || wasOffline) {
          fingerprint = next;
          render(body.data, progress);
        }
        setStatus('');
      } catch (err) {
        failures += 1;
        if (failures < OFFLINE_THRESHOLD) {
          setStatus(`Connection problem (${failures}/${OFFLINE_THRESHOLD}), retrying...`);
        } else if (!offline) {
          offline = true;
          fingerprint = fingerprintOf(DEMO_PLAYERS);
          render(DEMO_PLAYERS, DEMO_PROGRESS);
          setStatus('Offline: showing demo data.');
        }
      }
    };

    const mutate = async (action) => {
      if (isMutating) {
        return;
      }
      const amount = Number.parseInt(document.getElementById('amount').value, 10);
      if (!Number.isInteger(amount) || amount <= 0) {
        setStatus('Enter a positive number of assists.');
        return;
      }
      const gameDate = document.getElementById('game-date').value || undefined;
      const body = action === 'add'
        ? { assists_to_add: amount, game_date: gameDate }
        : { assists_to_remove: amount, game_date: gameDate };

      isMutating = true;
      try {
        const res = await fetch(`/players/${TRACKED_ID}/${action}-assists`, {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(body)
        });
        const payload = await res.json();
        if (!res.ok) {
          setStatus(payload.error || 'Update failed.');
          return;
        }
        lastLogId = payload.assistLogId;
        undoBtn.disabled = lastLogId == null;
        setStatus(`Saved ${action === 'add' ? '+' : '-'}${amount}.`);
      } catch (err) {
        setStatus('Could not reach the server.');
      } finally {
        isMutating = false;
      }
      await refresh();
    };

    const undo = async () => {
      if (isMutating || lastLogId == null) {
        return;
      }
      const id = lastLogId;
      isMutating = true;
      try {
        const res = await fetch(`/assists/${id}`, { method: 'DELETE' });
        const payload = await res.json();
        if (!res.ok) {
          setStatus(payload.error || 'Undo failed.');
        } else {
          setStatus(`Undid ${payload.data.assistsSubtracted} assists.`);
        }
        lastLogId = null;
        undoBtn.disabled = true;
      } catch (err) {
        setStatus('Could not reach the server.');
      } finally {
        isMutating = false;
      }
      await refresh();
    };

    form.addEventListener('submit', (event) => {
      event.preventDefault();
      const action = event.submitter ? event.submitter.dataset.action : 'add';
      mutate(action);
    });
    undoBtn.addEventListener('click', undo);

    refresh();
    setInterval(refresh, 15000);
  </script>
</body>
</html>
"#;
