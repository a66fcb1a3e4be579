flat_mod!(error, platform, device);
