pub mod predict_client;
