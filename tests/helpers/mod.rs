pub mod mock_settings;
