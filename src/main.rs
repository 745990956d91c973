use std::fs::File;
use std::io::{stdin, BufReader};
use std::path::PathBuf;

use clap::Parser;
use uuid::Uuid;

use mask_diagnosis::{
    Axis, CsvResultStore, DiagnosisSession, Error, Outcome, QuestionBank, ResultStore, Step,
    TypeCatalog, TypeProfile, MASK_TYPES, QUESTIONS, QUESTIONS_PER_PAGE,
};

#[derive(Parser)]
#[command(about = "仮面診断: 40問に答えて人前での振る舞いを16タイプで診断します")]
struct Args {
    /// 診断せずにタイプのプロフィールを表示する (例: SFCP)
    #[arg(long = "type")]
    type_code: Option<String>,

    /// 保存済みの診断件数をタイプ別に表示する
    #[arg(long, requires = "store")]
    stats: bool,

    /// 診断結果とフィードバックの保存先ディレクトリ
    #[arg(long, env = "MASK_DIAGNOSIS_STORE_DIR")]
    store: Option<PathBuf>,

    /// 設問JSON (省略時は同梱の40問)
    #[arg(long)]
    questions: Option<PathBuf>,

    /// タイプ定義JSON (省略時は同梱の16タイプ)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// 結果をJSONで出力する
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => TypeCatalog::from_reader(BufReader::new(File::open(path)?))?,
        None => MASK_TYPES.clone(),
    };

    if let Some(ref candidate) = args.type_code {
        let profile = catalog
            .lookup(candidate)
            .ok_or_else(|| Error::UnknownTypeCode(candidate.clone()))?;
        return print_profile(profile, None, args.json);
    }

    let mut store = args.store.clone().map(CsvResultStore::open).transpose()?;

    if args.stats {
        if let Some(ref store) = store {
            let stats = store.result_type_stats()?;
            if args.json {
                println!("{}", serde_json::to_string(&stats)?);
            } else {
                for profile in catalog.iter() {
                    let count = stats.get(&profile.code).copied().unwrap_or(0);
                    println!("{} {:>6}  {}", profile.code, count, profile.name);
                }
            }
        }
        return Ok(());
    }

    let bank = match &args.questions {
        Some(path) => QuestionBank::from_reader(BufReader::new(File::open(path)?))?,
        None => QUESTIONS.clone(),
    };
    if let Err(e) = bank.validate() {
        log::warn!("{e}");
    }

    let Some((session, outcome)) = run_diagnosis(&bank)? else {
        return Ok(());
    };

    // 保存の成否は結果表示に影響させない
    let record_id = match store.as_mut() {
        Some(store) => {
            match store.save_diagnosis_result(outcome.type_code, session.answers(), &outcome.scores) {
                Ok(record) => Some(record.id),
                Err(e) => {
                    log::error!("診断結果の保存に失敗しました: {e}");
                    None
                }
            }
        }
        None => None,
    };

    let profile = catalog
        .get(outcome.type_code)
        .ok_or_else(|| Error::UnknownTypeCode(outcome.type_code.to_string()))?;
    print_profile(profile, Some(&outcome), args.json)?;

    if let Some(ref mut store) = store {
        ask_feedback(store, record_id)?;
    }
    Ok(())
}

/// 1ページ5問ずつ回答を受け付ける。入力が途切れたら `None`
fn run_diagnosis(bank: &QuestionBank) -> Result<Option<(DiagnosisSession, Outcome)>, Error> {
    let mut buffer = String::new();
    let mut session = DiagnosisSession::new();
    let total_pages = DiagnosisSession::total_pages(bank);

    println!("「人前での自分」をイメージして回答してください。");
    println!("1 (Aに近い) 〜 6 (Bに近い) で入力、b で前のページに戻ります。");

    'page: loop {
        let page = session.current_page();
        println!();
        println!(
            "ページ {} / {}  ({} / {} 回答済み, {:.0}%)",
            page + 1,
            total_pages,
            session.answered_count(),
            bank.len(),
            session.progress(bank)
        );
        for (offset, question) in session.page_questions(bank).iter().enumerate() {
            println!();
            println!("質問 {}: {}", page * QUESTIONS_PER_PAGE + offset + 1, question.text);
            println!("  A: {}", question.options.a.text);
            println!("  B: {}", question.options.b.text);
            if let Some(level) = session.answers().get(question.id) {
                println!("  (前回の回答: {})", level.get());
            }
            loop {
                buffer.clear();
                if stdin().read_line(&mut buffer)? == 0 {
                    return Ok(None);
                }
                let input = buffer.trim();
                if input == "b" {
                    if page > 0 {
                        session.previous();
                        continue 'page;
                    }
                    println!("最初のページです。");
                    continue;
                }
                if store_answer(input, question.id, bank, &mut session).is_ok() {
                    break;
                }
                println!("回答は半角数字1〜6で入力してください。");
            }
        }
        match session.next(bank)? {
            Step::Page(_) => continue,
            Step::Finished(outcome) => return Ok(Some((session, outcome))),
        }
    }
}

fn store_answer(
    value: &str,
    question_id: u32,
    bank: &QuestionBank,
    session: &mut DiagnosisSession,
) -> Result<(), Error> {
    let value = value.parse::<u8>().map_err(|_| Error::IllegalAnswer)?;
    session.answer(bank, question_id, value)
}

fn print_profile(profile: &TypeProfile, outcome: Option<&Outcome>, json: bool) -> Result<(), Error> {
    if json {
        let value = serde_json::json!({
            "type_code": profile.code,
            "scores": outcome.map(|outcome| outcome.scores),
            "profile": profile,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("あなたのタイプは {} 「{}」", profile.code, profile.name);
    println!("{}", profile.short_label);
    println!();
    println!("{}", profile.description);
    println!();
    for axis in Axis::ALL {
        let pole = profile.code.pole(axis);
        match outcome {
            Some(outcome) => {
                let (a, b) = axis.poles();
                let pair = outcome.scores.pair(axis);
                println!(
                    "  {:<8} {} ({:>2} {}:{} {:<2})",
                    axis,
                    pole.label(),
                    pair.a,
                    a.as_char(),
                    b.as_char(),
                    pair.b
                );
            }
            None => println!("  {:<8} {}", axis, pole.label()),
        }
    }
    if let Some(ref details) = profile.details {
        if !details.characteristics.is_empty() {
            println!();
            println!("特徴");
            for item in &details.characteristics {
                println!("  ・{item}");
            }
        }
        if !details.tips.is_empty() {
            println!();
            println!("活かし方");
            for item in &details.tips {
                println!("  ・{item}");
            }
        }
    }
    Ok(())
}

fn ask_feedback(store: &mut CsvResultStore, record_id: Option<Uuid>) -> Result<(), Error> {
    let mut buffer = String::new();
    println!();
    println!("診断の満足度を1〜5で入力してください (空欄でスキップ)。");
    let rating = loop {
        buffer.clear();
        if stdin().read_line(&mut buffer)? == 0 {
            return Ok(());
        }
        let input = buffer.trim();
        if input.is_empty() {
            return Ok(());
        }
        match input.parse::<u8>() {
            Ok(rating) if (1..=5).contains(&rating) => break rating,
            _ => println!("満足度は半角数字1〜5で入力してください。"),
        }
    };

    println!("コメントがあれば入力してください (空欄でスキップ)。");
    buffer.clear();
    stdin().read_line(&mut buffer)?;

    match store.save_feedback(rating, Some(buffer.as_str()), record_id) {
        Ok(_) => println!("ありがとうございました。"),
        Err(e) => log::error!("フィードバックの保存に失敗しました: {e}"),
    }
    Ok(())
}
