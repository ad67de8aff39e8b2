//! Cluster a small labeled distance matrix under every linkage.
//!
//! Reads a lower-triangle matrix from the file given as the first argument,
//! or uses a built-in table of primate distances when none is given.
//!
//! ```text
//! cargo run --example labeled_matrix -- distances.tsv
//! ```

use hclust::{Clusterer, LabeledDistances, Linkage};

const BUILTIN: &str = "\
\tHuman\tChimp\tGorilla\tOrangutan
Chimp\t1.2
Gorilla\t1.6\t1.7
Orangutan\t3.1\t3.2\t3.0
Gibbon\t3.6\t3.7\t3.5\t3.3
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => BUILTIN.to_string(),
    };
    let labeled = LabeledDistances::parse_lower_triangle(&text)?;
    let n = labeled.labels().len();

    for linkage in Linkage::ALL {
        let dendro = Clusterer::new(labeled.matrix().clone(), linkage)?.run()?;
        println!("== {linkage} linkage ==");

        for row in dendro.linkage_table() {
            println!(
                "  {:>3} {:>3}  {:>8.4}  {}",
                row.cluster_a, row.cluster_b, row.distance, row.size
            );
        }

        for k in (1..=n.min(3)).rev() {
            let groups = labeled.group_names(&dendro.cut_by_count(k)?);
            println!("  k={k}: {groups:?}");
        }

        let order: Vec<&str> = dendro
            .leaves()
            .into_iter()
            .filter_map(|i| labeled.label(i))
            .collect();
        println!("  leaf order: {}", order.join(" "));
    }

    Ok(())
}
