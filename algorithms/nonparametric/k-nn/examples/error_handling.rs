//! Example demonstrating error handling with the k-NN classifier suite.
//!
//! Each degenerate input surfaces as a typed `KnnError` that callers can
//! match on instead of a panic.

use gknn_helpers::{DataPoint, Dataset, L2Dist};
use k_nn::{KnnClassifier, KnnError, OversizedK};
use ndarray::array;

fn main() {
    println!("k-NN Classifier Error Handling Examples");
    println!("=======================================");

    let training_data = match Dataset::new(
        vec![
            DataPoint::planar(1.0, 1.0, 0),
            DataPoint::planar(2.0, 2.0, 0),
            DataPoint::planar(1.0, 2.0, 0),
            DataPoint::planar(8.0, 8.0, 1),
            DataPoint::planar(9.0, 8.0, 1),
            DataPoint::planar(8.0, 9.0, 1),
        ],
        2,
    ) {
        Ok(dataset) => dataset,
        Err(e) => {
            println!("   ✗ Could not build dataset: {}", e);
            return;
        }
    };

    // Example 1: Handle invalid k value
    println!("\n1. Handling invalid k value (k=0):");
    match KnnClassifier::new(0, &training_data, L2Dist) {
        Ok(_) => println!("   Classifier created successfully"),
        Err(KnnError::InvalidK) => println!("   ✓ Caught expected error: {}", KnnError::InvalidK),
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 2: Handle empty training set
    println!("\n2. Handling empty training set:");
    if let Ok(empty) = Dataset::<f64>::new(vec![], 2) {
        if let Ok(classifier) = KnnClassifier::new(3, &empty, L2Dist) {
            match classifier.nearest_neighbor(array![1.0, 1.0].view()) {
                Ok(nn) => println!("   Predicted label: {}", nn.label),
                Err(e @ KnnError::EmptyTrainingSet) => println!("   ✓ Caught expected error: {}", e),
                Err(e) => println!("   ✗ Unexpected error: {}", e),
            }
        }
    }

    // Example 3: Oversized k with the strict policy
    println!("\n3. Rejecting k larger than the training set:");
    if let Ok(classifier) = KnnClassifier::new(10, &training_data, L2Dist) {
        let strict = classifier.with_oversized_k(OversizedK::Reject);
        match strict.k_nearest_neighbor(array![2.0, 2.0].view()) {
            Ok(vote) => println!("   Voted class {} with {} votes", vote.label, vote.count),
            Err(e @ KnnError::InsufficientNeighbors { .. }) => {
                println!("   ✓ Caught expected error: {}", e)
            }
            Err(e) => println!("   ✗ Unexpected error: {}", e),
        }
    }

    // Example 4: A query on top of a training point is not an error
    println!("\n4. Weighted vote for a query that coincides with a training point:");
    if let Ok(classifier) = KnnClassifier::new(3, &training_data, L2Dist) {
        match classifier.weighted_k_nearest_neighbor(array![8.0, 8.0].view()) {
            Ok(vote) => println!("   ✓ Class {} with weight {}", vote.label, vote.weight),
            Err(e) => println!("   ✗ Unexpected error: {}", e),
        }
    }

    // Example 5: Demonstrate error propagation in a function
    println!("\n5. Error propagation in functions:");

    fn classify_with_error_handling(dataset: &Dataset<f64>) -> Result<usize, KnnError> {
        let classifier = KnnClassifier::new(1, dataset, L2Dist)?;
        let nn = classifier.nearest_neighbor(array![0.5].view())?;
        Ok(nn.label)
    }

    match classify_with_error_handling(&training_data) {
        Ok(label) => println!("   ✓ Classification result: {}", label),
        Err(e) => println!("   ✓ Classification failed as expected: {}", e),
    }

    println!("\nAll examples completed successfully!");
}
