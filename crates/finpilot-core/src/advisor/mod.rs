pub mod spending;
