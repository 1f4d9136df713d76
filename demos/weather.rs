//! Trains on the classic weather table and prints the learned ruleset.

use ripper_rs::{Attribute, Dataset, Instance, Ripper, RipperConfig};

fn main() {
    env_logger::init();

    let mut data = Dataset::new(vec![
        Attribute::discrete("play", &["no", "yes"]),
        Attribute::discrete("outlook", &["sunny", "overcast", "rainy"]),
        Attribute::continuous("temperature"),
        Attribute::continuous("humidity"),
        Attribute::discrete("windy", &["true", "false"]),
    ])
    .expect("valid schema");

    let rows = [
        (0.0, 0.0, 85.0, 85.0, 1.0),
        (0.0, 0.0, 80.0, 90.0, 0.0),
        (1.0, 1.0, 83.0, 86.0, 1.0),
        (1.0, 2.0, 70.0, 96.0, 1.0),
        (1.0, 2.0, 68.0, 80.0, 1.0),
        (0.0, 2.0, 65.0, 70.0, 0.0),
        (1.0, 1.0, 64.0, 65.0, 0.0),
        (0.0, 0.0, 72.0, 95.0, 1.0),
        (1.0, 0.0, 69.0, 70.0, 1.0),
        (1.0, 2.0, 75.0, 80.0, 1.0),
        (1.0, 0.0, 75.0, 70.0, 0.0),
        (1.0, 1.0, 72.0, 90.0, 0.0),
        (1.0, 1.0, 81.0, 75.0, 1.0),
        (0.0, 2.0, 71.0, 91.0, 0.0),
    ];
    for (play, outlook, temp, hum, windy) in rows {
        data.push(Instance::new(vec![play, outlook, temp, hum, windy]))
            .expect("row matches schema");
    }

    let config = RipperConfig::builder()
        .seed(1)
        .pruning(false)
        .build()
        .expect("valid config");
    let model = Ripper::new(config).fit(&data).expect("training succeeds");

    println!("{model}");
    println!();

    let accuracy = model.evaluate(&data).expect("non-empty data");
    println!("training accuracy: {:.1}%", accuracy * 100.0);
    for measures in model.test(&data).expect("non-empty data") {
        println!(
            "class {}: sensitivity {:.2}, specificity {:.2}, ppv {:.2}",
            measures.class_index,
            measures.sensitivity(),
            measures.specificity(),
            measures.ppv()
        );
    }
}
