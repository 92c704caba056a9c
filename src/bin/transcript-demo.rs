#![forbid(unsafe_code)]
//! Builds a small transcript chain and prints it

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use transcriptchain::blockchain::format_timestamp;
use transcriptchain::crypto::digest_to_hex;
use transcriptchain::ledger::Ledger;
use transcriptchain::logging::{init_logging, LogFormat};
use transcriptchain::transcript::{Course, TranscriptHeader};

fn short(hex: &str) -> String {
    if hex.is_empty() {
        "-".to_string()
    } else if hex.len() > 16 {
        format!("{}...", &hex[..13])
    } else {
        hex.to_string()
    }
}

fn header(student_id: &str) -> TranscriptHeader {
    TranscriptHeader {
        student_id: student_id.to_string(),
        student_name: "Teerachot Sonnok".to_string(),
        faculty: "Engineering".to_string(),
        major: "Computer Engineering".to_string(),
        university: "Khon Kaen University".to_string(),
        gpa: 3.75,
    }
}

fn first_year_courses(first_code: &str) -> Vec<Course> {
    vec![
        Course::new(first_code, "English for Communication 1", "1/2023", 3, "A"),
        Course::new("CPE102", "Computer Programming I", "1/2023", 3, "B+"),
        Course::new("MAT101", "Calculus I", "1/2023", 4, "A"),
        Course::new("PHY101", "Physics I", "1/2023", 3, "B"),
        Course::new("PHY102", "Physics Laboratory I", "1/2023", 1, "A"),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("warn", LogFormat::Pretty)
        .map_err(|e| format!("Failed to initialise logging: {}", e))?;

    let mut ledger = Ledger::new();
    for (student_id, first_code) in [("B6419936", "ENG101"), ("B6419937", "ENG101_")] {
        for course in first_year_courses(first_code) {
            ledger.stage_course(course)?;
        }
        ledger.commit(header(student_id))?;
    }

    println!("{}", "📜 Transcript chain".bright_cyan().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Block").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Student").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Courses").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Prev. hash").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Merkle root").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Hash").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Time").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
        ]);

    for (index, block) in ledger.chain().blocks().iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("#{}", index)).fg(TableColor::White),
            Cell::new(&block.transcript().student_id).fg(TableColor::Green),
            Cell::new(block.transcript().courses.len()).fg(TableColor::White),
            Cell::new(short(&digest_to_hex(block.prev_hash()))).fg(TableColor::Grey),
            Cell::new(short(&digest_to_hex(block.merkle_root()))).fg(TableColor::Magenta),
            Cell::new(short(&block.hash_hex())).fg(TableColor::Yellow),
            Cell::new(format_timestamp(block.timestamp())).fg(TableColor::Grey),
        ]);
    }
    println!("{table}");
    println!();

    match ledger.validate() {
        Ok(()) => println!("{}", "✅ Blockchain is valid!".green().bold()),
        Err(e) => println!("{} {}", "❌ Blockchain validation failed:".red().bold(), e),
    }

    Ok(())
}
