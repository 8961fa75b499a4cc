pub mod atlas {
    pub mod domain {
        pub mod atlas;
        pub mod atlas_store;
    }
    pub mod infrastructure {
        pub mod json_atlas_store;
    }
}

pub mod clustering {
    pub mod domain {
        pub mod clustering_error;
        pub mod density_estimator;
        pub mod face_corpus;
        pub mod grid_layout;
        pub mod hard_assignment;
        pub mod outlier_filter;
    }
}

pub mod detection {
    pub mod domain {
        pub mod embedding_distance;
        pub mod face_detector;
        pub mod face_embedder;
    }
    pub mod infrastructure;
}

pub mod extraction {
    pub mod domain {
        pub mod image_extractor;
    }
    pub mod infrastructure {
        pub mod face_embedding_extractor;
    }
}

pub mod imaging {
    pub mod domain {
        pub mod grid_composer;
        pub mod image_reader;
        pub mod image_writer;
        pub mod thumbnail;
    }
    pub mod infrastructure {
        pub mod image_directory;
        pub mod image_file_reader;
        pub mod image_file_writer;
    }
}

pub mod pipeline {
    pub mod cluster_config;
    pub mod cluster_error;
    pub mod cluster_faces_use_case;
    pub mod extract_faces_use_case;
    pub mod extraction_executor;
    pub mod grid_summarizer;
    pub mod pipeline_logger;
    pub mod infrastructure {
        pub mod threaded_extraction_executor;
    }
}

pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod embedding;
    pub mod frame;
    pub mod model_resolver;
}
