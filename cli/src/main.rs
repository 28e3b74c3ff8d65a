use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, Level};
use twin_core::{
    AlterationKind, DashboardConfig, Difference, Insight, PatientProfile, SummaryText,
    TimelineEventKind, TwinAnalysis, NOT_AVAILABLE,
};
use twin_data::{
    alteration_records, canonical_records, clinical_overview, cna_stats, collect_patient_ids,
    copy_profiles, get_genomic_samples, get_timeline_events, get_treatment_lines,
    load_clinical_tables, load_genomics_tables, mutation_stats, sample_summaries, sv_stats,
    table_rows, treatment_columns, Dashboard,
};

#[derive(Parser, Debug)]
#[command(
    name = "twin-cli",
    about = "Xem dữ liệu phân tích cặp bệnh nhân song sinh số."
)]
struct Args {
    /// File cấu hình JSON (các trường thiếu lấy giá trị mặc định).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Thư mục phân tích, ghi đè cấu hình.
    #[arg(long, env = "TWIN_ANALYSES_DIR", global = true)]
    analyses: Option<PathBuf>,
    /// Thư mục hồ sơ bệnh nhân, ghi đè cấu hình.
    #[arg(long, env = "TWIN_PROFILES_DIR", global = true)]
    profiles: Option<PathBuf>,
    /// Tăng mức log (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Liệt kê các cặp song sinh.
    Analyses {
        /// In bản ghi gốc dạng JSON.
        #[arg(long)]
        json: bool,
    },
    /// Chi tiết một cặp.
    Pair { query: String, twin: String },
    /// Khung lâm sàng của một bệnh nhân.
    Patient { id: String },
    /// Tóm tắt di truyền theo từng mẫu.
    Genomics { id: String },
    /// Chép hồ sơ của các bệnh nhân có trong thư mục phân tích.
    CopyProfiles {
        #[arg(long)]
        source: PathBuf,
        #[arg(long)]
        destination: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = resolve_config(&args)?;
    debug!(?config, "configuration resolved");

    match args.command {
        Command::Analyses { json } => list_analyses(config, json),
        Command::Pair { query, twin } => show_pair(config, &query, &twin),
        Command::Patient { id } => show_patient(config, &id),
        Command::Genomics { id } => show_genomics(config, &id),
        Command::CopyProfiles {
            source,
            destination,
        } => run_copy(&config, source, destination),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &Args) -> anyhow::Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)
            .with_context(|| format!("Không đọc được cấu hình {:?}", path))?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = &args.analyses {
        config.analyses_dir = dir.clone();
    }
    if let Some(dir) = &args.profiles {
        config.profiles_dir = dir.clone();
    }
    Ok(config)
}

fn load_dashboard(config: DashboardConfig) -> anyhow::Result<Dashboard> {
    let analyses_dir = config.analyses_dir.clone();
    Dashboard::load(config)
        .with_context(|| format!("Không nạp được dữ liệu từ {:?}", analyses_dir))
}

fn list_analyses(config: DashboardConfig, json: bool) -> anyhow::Result<()> {
    let dashboard = load_dashboard(config)?;

    if json {
        let raw: Vec<_> = dashboard.analyses().iter().map(|a| &a.raw).collect();
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    for analysis in dashboard.analyses() {
        println!(
            "{} | similarity {} | clinical {} | genomic {} | biomarkers {} | {}",
            analysis.pair_label(),
            analysis.display_similarity(),
            analysis.clinical_pct.display(),
            analysis.genomic_pct.display(),
            analysis.shared_biomarker_count(),
            analysis.treatment_guidance.label()
        );
    }

    let average = dashboard
        .average_similarity()
        .map(|score| format!("{:.2}", score * 10.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    println!(
        "\nPairs: {}\nPatients: {}\nAverage similarity: {}\nSkipped files: {}",
        dashboard.analyses().len(),
        dashboard.profiles().len(),
        average,
        dashboard.skipped_files().count()
    );
    Ok(())
}

fn show_pair(config: DashboardConfig, query: &str, twin: &str) -> anyhow::Result<()> {
    let dashboard = load_dashboard(config)?;
    let Some(analysis) = dashboard.find_pair(query, twin) else {
        bail!("Không tìm thấy cặp {query} ↔ {twin}");
    };

    print_pair(analysis);

    let (query_profile, twin_profile) = dashboard.pair_profiles(analysis);
    println!("\nProfiles:");
    println!("  {}: {}", analysis.query_patient_id, profile_status(query_profile));
    println!("  {}: {}", analysis.twin_id, profile_status(twin_profile));
    Ok(())
}

fn print_pair(analysis: &TwinAnalysis) {
    let quality = &analysis.match_quality;
    println!("{} [{}]", analysis.pair_label(), analysis.filename);
    println!(
        "Similarity: {}  Clinical: {}  Genomic: {}  Grade: {}",
        analysis.display_similarity(),
        analysis.clinical_pct.display(),
        analysis.genomic_pct.display(),
        quality.grade_text()
    );
    println!("Assessment: {}", quality.assessment_text());
    print_list("Strengths", &quality.strengths);
    print_list("Weaknesses", &quality.weaknesses);
    print_list("Shared biomarkers", analysis.shared_features.biomarkers());

    let rows = analysis.clinical_summary.comparison_rows();
    if !rows.is_empty() {
        println!("\nClinical comparison:");
        for row in rows {
            let mark = if row.matches { "=" } else { "≠" };
            println!(
                "  {mark} {}: {} / {}",
                row.feature, row.query_value, row.twin_value
            );
        }
    }

    let genomic = &analysis.genomic_comparison;
    for (title, findings) in [
        ("Shared variants", &genomic.shared_variants),
        ("Query only", &genomic.query_unique),
        ("Twin only", &genomic.twin_unique),
    ] {
        let described: Vec<String> = findings.iter().map(|f| f.describe()).collect();
        print_list(title, &described);
    }

    if !analysis.differences.is_empty() {
        println!("\nKey differences:");
        for difference in &analysis.differences {
            match difference {
                Difference::Detailed {
                    feature,
                    query_value,
                    twin_value,
                    clinical_impact,
                } => {
                    println!("  {feature}: {query_value} / {twin_value}");
                    if let Some(impact) = clinical_impact {
                        println!("    impact: {impact}");
                    }
                }
                Difference::Note { text } => println!("  {text}"),
            }
        }
    }

    if !analysis.actionable_insights.is_empty() {
        println!("\nInsights:");
        for insight in &analysis.actionable_insights {
            match insight {
                Insight::Detailed {
                    insight,
                    recommended_action,
                    ..
                } => {
                    println!("  {insight}");
                    if let Some(action) = recommended_action {
                        println!("    action: {action}");
                    }
                }
                Insight::Note { text } => println!("  {text}"),
            }
        }
    }

    let recommendations: Vec<String> = analysis
        .recommendations
        .iter()
        .map(|r| match &r.confidence {
            Some(confidence) => format!("{} ({confidence})", r.recommendation),
            None => r.recommendation.clone(),
        })
        .collect();
    print_list("Recommendations", &recommendations);

    match &analysis.summary {
        Some(SummaryText::Text(text)) => println!("\nSummary: {text}"),
        Some(SummaryText::Fields(fields)) => {
            println!("\nSummary:");
            for field in fields {
                println!("  {}: {}", field.label, field.value);
            }
        }
        None => {}
    }
    println!(
        "\nTreatment guidance: {}",
        analysis.treatment_guidance.label()
    );
    if let Some(rationale) = &analysis.rationale {
        println!("Rationale: {rationale}");
    }
}

fn show_patient(config: DashboardConfig, id: &str) -> anyhow::Result<()> {
    let clinical_dir = config.clinical_dir.clone();
    let dashboard = load_dashboard(config)?;
    let profile = find_profile(&dashboard, id)?;
    let data = &profile.data;

    let overview = clinical_overview(data);
    println!("Patient {} [{}]", profile.id, profile.source_file);
    println!(
        "Age: {}  Sex: {}  Race: {}  Vital status: {}",
        overview.age, overview.sex, overview.race, overview.vital_status
    );
    println!(
        "Stage: {} ({})  Cancer: {} / {}",
        overview.stage_highest_recorded,
        overview.stage_category,
        overview.oncotree_code,
        overview.cancer_type_detailed
    );
    println!(
        "TMB: {}  MSI: {}  PD-L1: {}",
        overview.tmb_nonsynonymous, overview.msi_type, overview.pdl1_status
    );

    let lines = get_treatment_lines(data);
    if !lines.is_empty() {
        let columns = treatment_columns(lines);
        println!("\nTreatment lines:");
        print_table(&columns, &table_rows(lines, &columns));
    }

    println!("\nTimeline:");
    for kind in TimelineEventKind::ALL {
        println!(
            "  {}: {} event(s)",
            kind.label(),
            get_timeline_events(data, kind.key()).len()
        );
    }

    if let Some(dir) = clinical_dir {
        let tables = load_clinical_tables(&dir)
            .with_context(|| format!("Không đọc được bảng lâm sàng trong {:?}", dir))?;
        let rows: Vec<Vec<String>> = tables
            .patients
            .filter_eq("PATIENT_ID", id)
            .map(<[String]>::to_vec)
            .collect();
        if !rows.is_empty() {
            println!("\nClinical export:");
            print_table(&tables.patients.headers, &rows);
        }
    }
    Ok(())
}

fn show_genomics(config: DashboardConfig, id: &str) -> anyhow::Result<()> {
    let genomics_dir = config.genomics_dir.clone();
    let dashboard = load_dashboard(config)?;
    let profile = find_profile(&dashboard, id)?;
    let data = &profile.data;

    let summaries = sample_summaries(data);
    if summaries.is_empty() {
        println!("No genomic samples for {id}");
        return Ok(());
    }

    let tables = genomics_dir
        .map(|dir| {
            load_genomics_tables(&dir)
                .with_context(|| format!("Không đọc được bảng di truyền trong {:?}", dir))
        })
        .transpose()?;

    for ((_, sample), summary) in get_genomic_samples(data).into_iter().zip(&summaries) {
        println!(
            "\n{} ({}, {}): {} alteration(s)",
            summary.sample_id,
            summary.sample_type,
            summary.cancer_type,
            summary.total()
        );

        let mutations = canonical_records(
            alteration_records(sample, AlterationKind::Mutation),
            AlterationKind::Mutation,
        );
        let stats = mutation_stats(&mutations);
        println!(
            "  Mutations: {} (missense {}, genes {})",
            stats.total,
            optional_count(stats.missense),
            optional_count(stats.distinct_genes)
        );
        let top: Vec<String> = stats
            .top_genes
            .iter()
            .map(|(gene, count)| format!("{gene} ×{count}"))
            .collect();
        if !top.is_empty() {
            println!("  Top genes: {}", top.join(", "));
        }

        let cna = cna_stats(&canonical_records(
            alteration_records(sample, AlterationKind::CopyNumber),
            AlterationKind::CopyNumber,
        ));
        println!(
            "  CNA: {} (amplifications {}, deletions {})",
            cna.total,
            optional_count(cna.amplifications),
            optional_count(cna.deletions)
        );

        let sv = sv_stats(&canonical_records(
            alteration_records(sample, AlterationKind::StructuralVariant),
            AlterationKind::StructuralVariant,
        ));
        println!("  SV: {} (somatic {})", sv.total, optional_count(sv.somatic));

        if let Some(tables) = &tables {
            let annotated = tables
                .mutations
                .filter_eq("Tumor_Sample_Barcode", &summary.sample_id)
                .count();
            println!("  Annotated mutations: {annotated}");
        }
    }
    Ok(())
}

fn run_copy(config: &DashboardConfig, source: PathBuf, destination: PathBuf) -> anyhow::Result<()> {
    let ids = collect_patient_ids(&config.analyses_dir)
        .with_context(|| format!("Không đọc được thư mục phân tích {:?}", config.analyses_dir))?;
    let report = copy_profiles(&ids, &source, &destination)
        .with_context(|| format!("Không chép được hồ sơ từ {:?}", source))?;

    println!(
        "Patients referenced: {}\nCopied: {}\nMissing: {}",
        ids.len(),
        report.copied.len(),
        report.missing.len()
    );
    for id in &report.missing {
        println!("  missing {id}");
    }
    Ok(())
}

fn find_profile<'a>(
    dashboard: &'a Dashboard,
    id: &str,
) -> anyhow::Result<&'a PatientProfile> {
    match dashboard.profile(id) {
        Some(profile) => Ok(profile),
        None => bail!("Không tìm thấy hồ sơ bệnh nhân {id}"),
    }
}

fn profile_status(profile: Option<&PatientProfile>) -> String {
    match profile {
        Some(profile) => format!("loaded from {}", profile.source_file),
        None => "profile not found".to_string(),
    }
}

fn optional_count(count: Option<usize>) -> String {
    count.map_or_else(|| NOT_AVAILABLE.to_string(), |count| count.to_string())
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{title}:");
    for item in items {
        println!("  - {item}");
    }
}

fn print_table<S: AsRef<str>>(columns: &[S], rows: &[Vec<String>]) {
    let header: Vec<&str> = columns.iter().map(|column| column.as_ref()).collect();
    println!("  {}", header.join(" | "));
    for row in rows {
        println!("  {}", row.join(" | "));
    }
}
