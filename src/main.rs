use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use danci_webui::bridge::HostCapabilities;
use danci_webui::config::{Config, APP_NAME, APP_VERSION};
use danci_webui::logging;
use danci_webui::stores::{ColorScheme, LearningSnapshot};
use danci_webui::App;

const HELP: &str = ":next  下一个单词\n:show  显示答案\n:stats 刷新统计\n:reset 重置进度\n:theme <name>  切换主题\n:dark  切换深色模式\n:quit  退出\n其它输入作为答案提交";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    // no host channels in a terminal: every command goes to the simulator
    let app = App::new(&config, HostCapabilities::none());
    let scheme = ColorScheme::new(false);
    app.start(&scheme);

    println!("{APP_NAME} {APP_VERSION} (dev console)");
    println!("{HELP}");

    let mut updates = app.learning().subscribe();
    app.learning().load_random_word();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_snapshot(&snapshot);
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !handle_line(&app, line.trim()) {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    error!(error = %err, "failed to read stdin");
                    break;
                }
            },
        }
    }

    app.shutdown();
}

/// Returns false when the console should exit.
fn handle_line(app: &App, line: &str) -> bool {
    let learning = app.learning();
    match line.split_once(' ').unwrap_or((line, "")) {
        (":quit", _) => return false,
        (":next", _) => learning.load_random_word(),
        (":show", _) => {
            if !learning.show_answer() {
                println!("还没有单词");
            }
        }
        (":stats", _) => learning.request_stats(),
        (":reset", _) => learning.reset_progress(),
        (":theme", name) => {
            if app.theme().set_theme(name.trim()) {
                let p = app.theme().presentation();
                println!("主题: {} primary={} bg={}", name.trim(), p.primary, p.app_background);
            } else {
                println!("未知主题: {}", name.trim());
            }
        }
        (":dark", _) => {
            app.theme().toggle_dark_mode();
            println!("深色模式: {}", app.theme().state().dark_mode);
        }
        ("", _) => {}
        _ => {
            learning.set_user_answer(line);
            if !learning.submit_answer() {
                println!("当前不能提交答案");
            }
        }
    }
    true
}

fn print_snapshot(snapshot: &LearningSnapshot) {
    let word = snapshot
        .current_word
        .as_ref()
        .map(|w| format!("{} {}", w.pos, w.meaning))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "[{}] {} | 已掌握 {}/{} 错词 {} 进度 {:.0}%",
        snapshot.phase.as_str(),
        word,
        snapshot.stats.mastered_words,
        snapshot.stats.total_words,
        snapshot.stats.wrong_words,
        snapshot.stats.progress * 100.0
    );
    if let Some(feedback) = &snapshot.feedback {
        println!("  {}: {}", feedback.kind.as_str(), feedback.message);
    }
    if let Some(err) = &snapshot.error {
        println!("  错误: {err}");
    }
}
