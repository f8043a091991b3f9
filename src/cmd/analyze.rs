use mmkp_bench::analysis;
use mmkp_bench::config::{Paths, Settings};
use mmkp_bench::error::BenchResult;

pub fn run(settings: &Settings, paths: &Paths) -> BenchResult<()> {
    let workbook = analysis::problem_analysis(settings, paths)?;
    println!("\n🔎 Analysed {} group(s).", workbook.sheets().len());
    Ok(())
}
