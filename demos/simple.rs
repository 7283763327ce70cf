use femora_embed::EmbeddedInfo;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A pile of three beams embedded into the soil owned by core 0
    let pile = EmbeddedInfo::new(
        [1, 2, 3],
        0,
        vec![(vec![1, 2], vec![101, 102]), (vec![3], vec![103])],
    );

    // The neighbouring core reports the same pile with its lists shuffled
    let reported = EmbeddedInfo::new(
        [3, 1, 2],
        0,
        vec![(vec![3], vec![103]), (vec![1, 2], vec![102, 101])],
    );

    // A second pile that shares soil element 103 with the first
    let neighbour = EmbeddedInfo::new([4, 5], 1, vec![(vec![4, 5], vec![103, 104])]);

    println!("{pile} vs {reported}: {}", pile.compare(&reported));
    println!("{pile} vs {neighbour}: {}", pile.compare(&neighbour));

    // Comparing against something that is not a record is reported, not ignored
    if let Err(error) = pile.compare_dyn(&"pile") {
        println!("{error}");
    }

    // All done
    Ok(())
}
