use std::io::{self, BufWriter, Write};

use powerworks::{
    application::{
        error::AppError,
        portfolio::{Portfolio, PortfolioService},
        query::PortfolioQuery,
    },
    config::ProjectsArgs,
    domain::{filter::FilterState, types::ProjectRecord},
};

pub async fn print_projects(service: &PortfolioService, args: &ProjectsArgs) -> Result<(), AppError> {
    let state = filter_state(args)?;
    let portfolio = service.load().await?;
    let matches = portfolio.filter(&state);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if args.json {
        write_json(&mut out, &matches)?;
    } else {
        write_table(&mut out, &portfolio, &matches)?;
    }
    out.flush()
        .map_err(|e| AppError::unexpected(format!("failed to write output: {e}")))
}

/// The command line takes the same filter vocabulary as the page URL.
fn filter_state(args: &ProjectsArgs) -> Result<FilterState, AppError> {
    let query = PortfolioQuery {
        q: args.query.clone(),
        sector: args.sector.clone(),
        status: args.status.clone(),
        sort: args.sort.clone(),
        ..Default::default()
    };
    Ok(query.filter_state()?)
}

fn write_json(out: &mut impl Write, records: &[&ProjectRecord]) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, records)
        .map_err(|e| AppError::unexpected(format!("failed to encode projects: {e}")))?;
    write_line(out, "")
}

fn write_table(
    out: &mut impl Write,
    portfolio: &Portfolio,
    records: &[&ProjectRecord],
) -> Result<(), AppError> {
    write_line(out, "slug\ttitle\tsector\tstatus\tyear\tfeatured")?;
    for record in records {
        let year = record.year.map(|y| y.to_string()).unwrap_or_default();
        let line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            record.slug,
            record.title,
            record.sector.as_str(),
            record.status.as_str(),
            year,
            record.featured
        );
        write_line(out, &line)?;
    }

    let tally = portfolio.tally();
    let summary = format!(
        "# showing {} of {} ({} ongoing, {} completed)",
        records.len(),
        tally.total,
        tally.ongoing,
        tally.completed
    );
    write_line(out, &summary)
}

fn write_line(out: &mut impl Write, line: &str) -> Result<(), AppError> {
    writeln!(out, "{line}").map_err(|e| AppError::unexpected(format!("failed to write output: {e}")))
}
