use clap::Parser;
use mask_diagnosis::{
    calculate_scores, determine_type_code, read_bulk, Error, QuestionBank, QUESTIONS,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// 回答CSV (`id,1,2,...,40`) を一括で診断する
#[derive(Parser)]
struct Args {
    path: PathBuf,

    /// 設問JSON (省略時は同梱の40問)
    #[arg(long)]
    questions: Option<PathBuf>,

    /// 1行1件のJSONで出力する
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let bank = match &args.questions {
        Some(path) => QuestionBank::from_reader(BufReader::new(File::open(path)?))?,
        None => QUESTIONS.clone(),
    };
    let reader = BufReader::new(File::open(&args.path)?);
    for row in read_bulk(reader)? {
        match row {
            Ok((id, answers)) => {
                if answers.len() < bank.len() {
                    log::warn!("id = {id}: {} / {} answered", answers.len(), bank.len());
                }
                let scores = calculate_scores(bank.questions(), &answers);
                let type_code = determine_type_code(&scores);
                if args.json {
                    let value = serde_json::json!({
                        "id": id,
                        "type_code": type_code,
                        "scores": scores,
                    });
                    println!("{value}");
                } else {
                    println!("id = {}, type = {}, scores = {}", id, type_code, scores);
                }
            }
            Err(e) => {
                log::error!("{e}");
            }
        }
    }
    Ok(())
}
